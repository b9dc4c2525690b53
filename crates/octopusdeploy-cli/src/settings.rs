//! Provider settings
//!
//! Connection settings come from, in increasing precedence, the YAML settings
//! file, the `OCTOPUS_*` environment variables and command-line flags. The
//! result becomes the provider block handed to `configure`.

use std::path::{Path, PathBuf};

use clap::Args;
use octopusdeploy_framework::Value;
use serde::Deserialize;

use crate::error::{CliError, Result};

/// Directory below the user's config directory holding `config.yaml`
pub const CONFIG_DIR_NAME: &str = "terraform-provider-octopusdeploy";

/// Connection flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Octopus Deploy server URL
    #[arg(long, global = true, env = "OCTOPUS_URL")]
    pub address: Option<String>,

    /// API key
    #[arg(long, global = true, env = "OCTOPUS_APIKEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OIDC access token, instead of an API key
    #[arg(long, global = true, env = "OCTOPUS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Space ID used when a resource does not set one
    #[arg(long, global = true, env = "OCTOPUS_SPACE_ID")]
    pub space_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub address: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub space_id: Option<String>,
}

impl Settings {
    /// `<config_dir>/terraform-provider-octopusdeploy/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.yaml"))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| CliError::config(format!("invalid settings file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read settings file {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load an explicitly named file, which must exist, or the default file
    /// when present
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply flags and environment over the file
    ///
    /// Credentials are taken as a pair: when either is given on the command
    /// line, the file's credentials are ignored.
    pub fn merge(mut self, args: &ConnectionArgs) -> Self {
        let given = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        if let Some(address) = given(&args.address) {
            self.address = Some(address);
        }
        if given(&args.api_key).is_some() || given(&args.access_token).is_some() {
            self.api_key = given(&args.api_key);
            self.access_token = given(&args.access_token);
        }
        if let Some(space_id) = given(&args.space_id) {
            self.space_id = Some(space_id);
        }
        self
    }

    /// The provider block
    pub fn provider_config(&self) -> Value {
        Value::object([
            ("address", Value::from(self.address.clone())),
            ("api_key", Value::from(self.api_key.clone())),
            ("access_token", Value::from(self.access_token.clone())),
            ("space_id", Value::from(self.space_id.clone())),
        ])
    }
}
