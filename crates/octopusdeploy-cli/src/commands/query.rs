//! Query command - read a data source

use std::path::Path;

use octopusdeploy_framework::Value;

use crate::commands::{Session, report};
use crate::error::{CliError, Result};
use crate::{display, files};

pub async fn run(session: &Session, type_name: &str, config_path: Option<&Path>) -> Result<()> {
    session.require_data_source(type_name)?;
    let config = match config_path {
        Some(path) => files::read_config(path)?,
        None => Value::Object(Default::default()),
    };

    let diags = session.server.data_source(type_name)?.schema().validate(&config);
    if diags.has_errors() {
        report(&diags, CliError::validation)?;
    }

    session.configure().await?;
    let response = session.server.read_data_source(type_name, &config).await?;
    report(&response.diagnostics, |errors| CliError::provider("Query", errors))?;
    let result = response
        .value
        .ok_or_else(|| CliError::internal(format!("reading {} returned nothing", type_name)))?;

    println!("{}", display::pretty(&result));
    Ok(())
}
