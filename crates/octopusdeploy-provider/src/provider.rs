//! The Octopus Deploy provider
//!
//! Holds the provider configuration schema and the client shared with every
//! resource and data source once `configure` has run.

use std::sync::Arc;

use async_trait::async_trait;
use octopusdeploy_client::config::{
    ENV_OCTOPUS_ACCESS_TOKEN, ENV_OCTOPUS_APIKEY, ENV_OCTOPUS_SPACE_ID, ENV_OCTOPUS_URL,
};
use octopusdeploy_client::{
    ClientConfig, ClientError, Credentials, OctopusClient, RedirectionSettings,
};
use octopusdeploy_framework::validators::conflicts_with;
use octopusdeploy_framework::{
    AttrType, Attribute, DataSource, Diagnostics, Provider, Resource, Schema, Value,
};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::deprecations::DeprecationReversals;
use crate::{data_sources, resources, util};

/// Type name prefix of every resource and data source
pub const PROVIDER_TYPE_NAME: &str = "octopusdeploy";

/// State shared between the provider and its resources
#[derive(Clone)]
pub struct ProviderData {
    client: Arc<OnceCell<OctopusClient>>,
    deprecations: Arc<DeprecationReversals>,
}

impl Default for ProviderData {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderData {
    /// Unconfigured, with deprecation reversals read from the environment
    pub fn new() -> Self {
        Self {
            client: Arc::new(OnceCell::new()),
            deprecations: Arc::new(DeprecationReversals::global().clone()),
        }
    }

    /// Already configured with a client
    pub fn with_client(client: OctopusClient) -> Self {
        let data = Self::new();
        // A fresh cell is always empty
        let _ = data.client.set(client);
        data
    }

    pub fn with_deprecations(mut self, deprecations: DeprecationReversals) -> Self {
        self.deprecations = Arc::new(deprecations);
        self
    }

    /// Store the configured client; false if one was already set
    pub fn set_client(&self, client: OctopusClient) -> bool {
        self.client.set(client).is_ok()
    }

    /// The configured client, or an error diagnostic
    pub fn client(&self, diags: &mut Diagnostics) -> Option<&OctopusClient> {
        let client = self.client.get();
        if client.is_none() {
            diags.add_error(
                "Provider not configured",
                "The Octopus Deploy provider has not been configured. Set address and an api_key or access_token in the provider block.",
            );
        }
        client
    }

    pub fn deprecations(&self) -> &DeprecationReversals {
        &self.deprecations
    }
}

/// Provider block as written by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfigModel {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub space_id: Option<String>,
}

impl ProviderConfigModel {
    /// Fill unset attributes from the environment and build the client
    /// configuration
    pub fn resolve(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig, ClientError> {
        let set = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        let address = set(&self.address)
            .or_else(|| lookup(ENV_OCTOPUS_URL))
            .ok_or_else(|| ClientError::InvalidConfig {
                message: format!("address must be set in the provider block or through {}", ENV_OCTOPUS_URL),
            })?;

        // Credentials come entirely from the block or entirely from the environment
        let credentials = if set(&self.api_key).is_some() || set(&self.access_token).is_some() {
            Credentials::from_parts(self.api_key.as_deref(), self.access_token.as_deref())?
        } else {
            let api_key = lookup(ENV_OCTOPUS_APIKEY);
            let access_token = lookup(ENV_OCTOPUS_ACCESS_TOKEN);
            Credentials::from_parts(api_key.as_deref(), access_token.as_deref())?
        };

        let mut config = ClientConfig::new(&address, credentials)?;
        if let Some(space_id) = set(&self.space_id).or_else(|| lookup(ENV_OCTOPUS_SPACE_ID)) {
            config = config.with_space_id(space_id);
        }
        config.validate()?;
        Ok(config)
    }
}

/// The `octopusdeploy` provider
pub struct OctopusDeployProvider {
    data: ProviderData,
    redirection: RedirectionSettings,
}

impl Default for OctopusDeployProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OctopusDeployProvider {
    /// Unconfigured provider, reading redirection settings from the environment
    pub fn new() -> Self {
        Self {
            data: ProviderData::new(),
            redirection: RedirectionSettings::from_env(),
        }
    }

    /// Provider sharing existing data, e.g. a preconfigured client
    pub fn with_data(data: ProviderData) -> Self {
        Self {
            data,
            redirection: RedirectionSettings::from_env(),
        }
    }

    pub fn data(&self) -> &ProviderData {
        &self.data
    }
}

#[async_trait]
impl Provider for OctopusDeployProvider {
    fn type_name(&self) -> &str {
        PROVIDER_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Use the Octopus Deploy provider to manage Octopus Deploy resources.")
            .attribute(
                "address",
                Attribute::optional(AttrType::String).description(
                    "The endpoint of the Octopus REST API. Falls back to OCTOPUS_URL.",
                ),
            )
            .attribute(
                "api_key",
                Attribute::optional(AttrType::String)
                    .sensitive()
                    .description("The API key to use with the Octopus REST API. Falls back to OCTOPUS_APIKEY.")
                    .validator(conflicts_with(&["access_token"])),
            )
            .attribute(
                "access_token",
                Attribute::optional(AttrType::String)
                    .sensitive()
                    .description("The OIDC access token to use with the Octopus REST API. Falls back to OCTOPUS_ACCESS_TOKEN."),
            )
            .attribute(
                "space_id",
                Attribute::optional(AttrType::String).description(
                    "The space ID to target. Falls back to OCTOPUS_SPACE_ID.",
                ),
            )
    }

    async fn configure(&self, diags: &mut Diagnostics, config: &Value) -> Option<()> {
        let model: ProviderConfigModel = util::decode(diags, config)?;
        let client_config = match model.resolve(|name| std::env::var(name).ok()) {
            Ok(c) => c,
            Err(e) => {
                diags.add_error("Invalid provider configuration", e.to_string());
                return None;
            }
        };

        let address = client_config.address.to_string();
        let client = match OctopusClient::new(client_config, &self.redirection) {
            Ok(c) => c,
            Err(e) => {
                diags.add_error("Unable to create Octopus Deploy client", e.to_string());
                return None;
            }
        };
        tracing::info!(address = %address, space_id = ?client.space_id(), "configured Octopus Deploy provider");

        if !self.data.set_client(client) {
            tracing::warn!("provider already configured; keeping the first client");
        }
        Some(())
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        resources::all(&self.data)
    }

    fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
        data_sources::all(&self.data)
    }
}
