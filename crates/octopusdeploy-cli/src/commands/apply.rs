//! Apply command - create, update or replace a resource

use std::path::Path;

use octopusdeploy_framework::PlanAction;

use crate::commands::{Session, plan, report};
use crate::error::{CliError, Result};
use crate::{display, files};

pub async fn run(
    session: &Session,
    type_name: &str,
    config_path: &Path,
    state_path: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    session.require_resource(type_name)?;
    let config = files::read_config(config_path)?;
    let prior = plan::prior_state(type_name, state_path)?;

    let change = plan::planned(session, type_name, &prior, &config).await?;
    let schema = session.server.resource(type_name)?.schema();
    eprintln!("{}", display::format_plan(type_name, &schema, &prior, &change));

    if change.action == PlanAction::NoOp {
        if let Some(path) = out {
            files::write_state(path, type_name, &prior)?;
        }
        display::success("No changes. The resource matches the configuration.");
        return Ok(());
    }

    session.configure().await?;
    let response = session.server.apply(type_name, &prior, &change).await?;
    if response.diagnostics.has_errors() {
        // A partly applied change still created the object
        if let (Some(state), Some(path)) = (&response.value, out.or(state_path)) {
            files::write_state(path, type_name, state)?;
            display::warning(&format!("Recorded the partly applied state in {}", path.display()));
        }
    }
    report(&response.diagnostics, |errors| CliError::provider("Apply", errors))?;
    let state = response
        .value
        .ok_or_else(|| CliError::internal(format!("applying {} returned no state", type_name)))?;

    match out.or(state_path) {
        Some(path) => files::write_state(path, type_name, &state)?,
        None => println!("{}", display::pretty(&display::redact(&schema, &state))),
    }

    let done = match change.action {
        PlanAction::Create => "created",
        PlanAction::Replace => "replaced",
        _ => "updated",
    };
    display::success(&format!(
        "Apply complete! {} {} {}",
        type_name,
        state.get("id").as_str().unwrap_or_default(),
        done
    ));
    Ok(())
}
