//! Destroy command - delete a resource and its state file

use std::path::Path;

use crate::commands::{Session, report};
use crate::error::{CliError, Result};
use crate::{display, files};

pub async fn run(session: &Session, type_name: &str, state_path: &Path) -> Result<()> {
    session.require_resource(type_name)?;
    let state = files::read_state(state_path, type_name)?;
    session.configure().await?;

    let diags = session.server.destroy(type_name, &state).await?;
    report(&diags, |errors| CliError::provider("Destroy", errors))?;

    files::remove_state(state_path)?;
    display::success(&format!(
        "Destroy complete! {} {} deleted",
        type_name,
        state.get("id").as_str().unwrap_or_default()
    ));
    Ok(())
}
