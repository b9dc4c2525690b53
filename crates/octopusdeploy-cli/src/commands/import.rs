//! Import command - adopt an existing Octopus Deploy object

use std::path::Path;

use crate::commands::{Session, report};
use crate::error::{CliError, Result};
use crate::{display, files};

pub async fn run(session: &Session, type_name: &str, id: &str, out: Option<&Path>) -> Result<()> {
    session.require_resource(type_name)?;
    session.configure().await?;

    let response = session.server.import(type_name, id).await?;
    report(&response.diagnostics, |errors| CliError::provider("Import", errors))?;
    let state = response
        .value
        .ok_or_else(|| CliError::internal(format!("importing {} returned no state", id)))?;

    match out {
        Some(path) => {
            files::write_state(path, type_name, &state)?;
            display::success(&format!("Imported {} {} into {}", type_name, id, path.display()));
        }
        None => println!("{}", files::render_state(type_name, &state)?),
    }
    Ok(())
}
