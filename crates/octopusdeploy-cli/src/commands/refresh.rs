//! Refresh command - reread a resource and update its state file

use std::path::Path;

use crate::commands::{Session, report};
use crate::error::{CliError, Result};
use crate::{display, files};

pub async fn run(session: &Session, type_name: &str, state_path: &Path, out: Option<&Path>) -> Result<()> {
    session.require_resource(type_name)?;
    let state = files::read_state(state_path, type_name)?;
    session.configure().await?;

    let response = session.server.read(type_name, &state).await?;
    report(&response.diagnostics, |errors| CliError::provider("Refresh", errors))?;

    let refreshed = response.value.unwrap_or_default();
    if refreshed.is_null() {
        display::warning(&format!(
            "{} no longer exists; removing {}",
            type_name,
            state_path.display()
        ));
        return files::remove_state(state_path);
    }

    let schema = session.server.resource(type_name)?.schema();
    if schema.normalize(&state) != refreshed {
        display::warning(&format!("{} has drifted from the recorded state", type_name));
    }
    files::write_state(out.unwrap_or(state_path), type_name, &refreshed)?;
    display::success(&format!("Refreshed {}", type_name));
    Ok(())
}
