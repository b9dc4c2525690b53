//! CLI commands

use std::sync::Arc;

use octopusdeploy_framework::{Diagnostics, ProviderServer};
use octopusdeploy_provider::OctopusDeployProvider;

use crate::display;
use crate::error::{CliError, Result};
use crate::settings::Settings;

pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod query;
pub mod refresh;
pub mod schema;
pub mod validate;

/// The provider server plus the settings used to configure it
pub struct Session {
    pub server: ProviderServer,
    settings: Settings,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            server: ProviderServer::new(Arc::new(OctopusDeployProvider::new())),
            settings,
        }
    }

    /// Configure the provider; needed before any call to Octopus Deploy
    pub async fn configure(&self) -> Result<()> {
        let response = self.server.configure(&self.settings.provider_config()).await;
        display::print_diagnostics(&response.diagnostics);
        if response.diagnostics.has_errors() {
            return Err(CliError::config_with_help(
                "the provider could not be configured",
                "Set --address and --api-key (or --access-token), the OCTOPUS_* environment variables, or a settings file.",
            ));
        }
        Ok(())
    }

    pub fn require_resource(&self, type_name: &str) -> Result<()> {
        if self.server.resource(type_name).is_ok() {
            return Ok(());
        }
        Err(CliError::UnknownType {
            kind: "resource type",
            name: type_name.to_string(),
            help: display::suggest(type_name, self.server.resource_types()),
        })
    }

    pub fn require_data_source(&self, type_name: &str) -> Result<()> {
        if self.server.data_source(type_name).is_ok() {
            return Ok(());
        }
        Err(CliError::UnknownType {
            kind: "data source",
            name: type_name.to_string(),
            help: display::suggest(type_name, self.server.data_source_types()),
        })
    }
}

/// Print diagnostics; fail with `on_error` when any is an error
pub fn report(diags: &Diagnostics, on_error: impl FnOnce(usize) -> CliError) -> Result<()> {
    display::print_diagnostics(diags);
    if diags.has_errors() {
        return Err(on_error(diags.error_count()));
    }
    Ok(())
}
