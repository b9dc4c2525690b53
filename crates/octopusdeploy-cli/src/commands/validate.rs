//! Validate command - check a resource configuration without planning

use std::path::Path;

use crate::commands::{Session, report};
use crate::error::{CliError, Result};
use crate::{display, files};

pub async fn run(session: &Session, type_name: &str, config_path: &Path) -> Result<()> {
    session.require_resource(type_name)?;
    let config = files::read_config(config_path)?;

    let diags = session.server.validate_resource_config(type_name, &config).await?;
    report(&diags, CliError::validation)?;

    display::success(&format!("{} configuration is valid", type_name));
    Ok(())
}
