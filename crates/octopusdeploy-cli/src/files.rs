//! Configuration and state files
//!
//! Configuration files hold one resource or data source body as JSON, or as
//! YAML when the extension is `.yaml`/`.yml`. State files are JSON written by
//! `apply`, `refresh` and `import` and record which resource type they hold.

use std::path::Path;

use octopusdeploy_framework::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CliError, Result};

/// Contents of a state file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub resource_type: String,
    pub state: JsonValue,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse a configuration body
pub fn parse_config(content: &str, yaml: bool) -> Result<Value> {
    let json: JsonValue = if yaml {
        serde_yaml::from_str(content).map_err(|e| CliError::config(format!("invalid YAML: {}", e)))?
    } else {
        serde_json::from_str(content).map_err(|e| CliError::config(format!("invalid JSON: {}", e)))?
    };
    if !json.is_object() {
        return Err(CliError::config_with_help(
            "configuration must be an object",
            "Write the resource's attributes as keys, e.g. {\"name\": \"Production\"}.",
        ));
    }
    Ok(Value::from_json(json))
}

pub fn read_config(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, is_yaml(path))
        .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))
}

/// Read the state of `resource_type` from `path`
pub fn read_state(path: &Path, resource_type: &str) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let file: StateFile = serde_json::from_str(&content).map_err(|e| {
        CliError::config(format!("{} is not a state file: {}", path.display(), e))
    })?;
    if file.resource_type != resource_type {
        return Err(CliError::config(format!(
            "{} holds the state of {}, not {}",
            path.display(),
            file.resource_type,
            resource_type
        )));
    }
    Ok(Value::from_json(file.state))
}

pub fn render_state(resource_type: &str, state: &Value) -> Result<String> {
    let file = StateFile {
        resource_type: resource_type.to_string(),
        state: state.to_json().map_err(|e| CliError::internal(e.to_string()))?,
    };
    serde_json::to_string_pretty(&file).map_err(|e| CliError::internal(e.to_string()))
}

pub fn write_state(path: &Path, resource_type: &str, state: &Value) -> Result<()> {
    let rendered = render_state(resource_type, state)?;
    std::fs::write(path, rendered + "\n")?;
    tracing::debug!(path = %path.display(), "wrote state");
    Ok(())
}

/// Remove a state file whose object no longer exists
pub fn remove_state(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
