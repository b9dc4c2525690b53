//! Plan command - show what applying a configuration would change

use std::path::Path;

use octopusdeploy_framework::{PlannedChange, Value};

use crate::commands::{Session, report};
use crate::error::{CliError, Result};
use crate::{display, files};

/// Prior state from an optional state file; null when creating
pub fn prior_state(type_name: &str, state_path: Option<&Path>) -> Result<Value> {
    match state_path {
        Some(path) if path.exists() => files::read_state(path, type_name),
        _ => Ok(Value::Null),
    }
}

/// Validate and plan; diagnostics are printed
pub async fn planned(
    session: &Session,
    type_name: &str,
    prior: &Value,
    config: &Value,
) -> Result<PlannedChange> {
    let response = session.server.plan(type_name, prior, config).await?;
    report(&response.diagnostics, CliError::validation)?;
    response
        .value
        .ok_or_else(|| CliError::internal(format!("planning {} produced no change", type_name)))
}

pub async fn run(session: &Session, type_name: &str, config_path: &Path, state_path: Option<&Path>) -> Result<()> {
    session.require_resource(type_name)?;
    let config = files::read_config(config_path)?;
    let prior = prior_state(type_name, state_path)?;

    let change = planned(session, type_name, &prior, &config).await?;
    let schema = session.server.resource(type_name)?.schema();
    println!("{}", display::format_plan(type_name, &schema, &prior, &change));
    Ok(())
}
