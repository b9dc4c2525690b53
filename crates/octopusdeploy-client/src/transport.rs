//! HTTP transports
//!
//! Requests go to the Octopus server either directly or through the
//! redirection service. Redirection is opt-in (`REDIRECTION_SERVICE_ENABLED`)
//! and never applies to Octopus Cloud hosts or the local machine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::error::{ClientError, Result};

/// Environment variable that turns on the redirection service
pub const ENV_REDIRECTION_SERVICE_ENABLED: &str = "REDIRECTION_SERVICE_ENABLED";

/// Environment variable holding the redirection service API key
pub const ENV_REDIRECTION_SERVICE_API_KEY: &str = "REDIRECTION_SERVICE_API_KEY";

/// Header naming the Octopus server the redirection service forwards to
pub const UPSTREAM_HOST_HEADER: &str = "x_redirection_upstream_host";

/// Header authenticating against the redirection service
pub const SERVICE_API_KEY_HEADER: &str = "x_redirection_service_api_key";

/// Where redirected requests are sent unless configured otherwise
pub const DEFAULT_REDIRECTION_ENDPOINT: &str = "https://localhost:8643";

/// Host suffixes that are always reached directly
const DIRECT_HOST_SUFFIXES: &[&str] = &[".octopus.app", ".testoctopus.com"];

/// Hosts that are always reached directly
const DIRECT_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Sends prepared requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Sends requests straight to their URL
pub struct DirectTransport {
    client: reqwest::Client,
}

impl DirectTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        Ok(self.client.execute(request).await?)
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Rewrites every request to go through the redirection service
pub struct RedirectingTransport {
    client: reqwest::Client,
    endpoint: Url,
    api_key: HeaderValue,
}

impl RedirectingTransport {
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: &str) -> Result<Self> {
        if endpoint.host_str().is_none() {
            return Err(ClientError::InvalidConfig {
                message: format!("redirection endpoint {} has no host", endpoint),
            });
        }
        let mut api_key =
            HeaderValue::from_str(api_key).map_err(|e| ClientError::InvalidConfig {
                message: format!("invalid redirection service API key: {}", e),
            })?;
        api_key.set_sensitive(true);

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Point the request at the redirection service and tag it with the
    /// original host
    pub fn redirect(&self, request: &mut reqwest::Request) -> Result<()> {
        let upstream = host_with_port(request.url()).ok_or_else(|| ClientError::InvalidConfig {
            message: format!("request URL {} has no host", request.url()),
        })?;

        let url = request.url_mut();
        url.set_scheme(self.endpoint.scheme())
            .map_err(|_| ClientError::InvalidConfig {
                message: format!("cannot use scheme of {}", self.endpoint),
            })?;
        url.set_host(self.endpoint.host_str())?;
        url.set_port(self.endpoint.port())
            .map_err(|_| ClientError::InvalidConfig {
                message: format!("cannot use port of {}", self.endpoint),
            })?;

        let upstream =
            HeaderValue::from_str(&upstream).map_err(|e| ClientError::InvalidConfig {
                message: format!("invalid upstream host: {}", e),
            })?;
        let headers = request.headers_mut();
        headers.insert(HeaderName::from_static(UPSTREAM_HOST_HEADER), upstream);
        headers.insert(
            HeaderName::from_static(SERVICE_API_KEY_HEADER),
            self.api_key.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl Transport for RedirectingTransport {
    async fn execute(&self, mut request: reqwest::Request) -> Result<reqwest::Response> {
        self.redirect(&mut request)?;
        Ok(self.client.execute(request).await?)
    }

    fn name(&self) -> &'static str {
        "redirected"
    }
}

/// Redirection settings, usually read from the environment
#[derive(Debug, Clone)]
pub struct RedirectionSettings {
    /// True only when the flag is exactly `"true"`
    pub enabled: bool,

    /// API key presented to the redirection service
    pub api_key: Option<String>,

    /// Redirection service endpoint
    pub endpoint: String,
}

impl Default for RedirectionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            endpoint: DEFAULT_REDIRECTION_ENDPOINT.to_string(),
        }
    }
}

impl RedirectionSettings {
    /// Build settings from raw flag and key values
    pub fn from_values(enabled: Option<&str>, api_key: Option<&str>) -> Self {
        Self {
            enabled: enabled == Some("true"),
            api_key: api_key.map(str::to_string).filter(|k| !k.is_empty()),
            endpoint: DEFAULT_REDIRECTION_ENDPOINT.to_string(),
        }
    }

    /// Read `REDIRECTION_SERVICE_ENABLED` and `REDIRECTION_SERVICE_API_KEY`
    pub fn from_env() -> Self {
        let enabled = std::env::var(ENV_REDIRECTION_SERVICE_ENABLED).ok();
        let api_key = std::env::var(ENV_REDIRECTION_SERVICE_API_KEY).ok();
        Self::from_values(enabled.as_deref(), api_key.as_deref())
    }

    /// Use a different redirection service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Whether requests to `address` bypass the redirection service
pub fn is_directly_accessible_octopus_instance(address: &str, settings: &RedirectionSettings) -> bool {
    if !settings.enabled {
        return true;
    }

    let Ok(url) = Url::parse(address) else {
        return true;
    };
    let Some(host) = url.host_str() else {
        return true;
    };
    let host = host.to_ascii_lowercase();

    DIRECT_HOSTS.contains(&host.as_str())
        || DIRECT_HOST_SUFFIXES
            .iter()
            .any(|suffix| host.ends_with(suffix))
}

/// Build the transport for a server address
pub fn build_transport(
    address: &str,
    settings: &RedirectionSettings,
    timeout: Duration,
) -> Result<Arc<dyn Transport>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(
            "terraform-provider-octopusdeploy/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .map_err(|e| ClientError::NetworkError {
            message: e.to_string(),
        })?;

    if is_directly_accessible_octopus_instance(address, settings) {
        tracing::debug!(address, "using direct transport");
        return Ok(Arc::new(DirectTransport::new(client)));
    }

    let api_key = settings
        .api_key
        .as_deref()
        .ok_or_else(|| ClientError::InvalidConfig {
            message: format!(
                "{} must be set when {} is true",
                ENV_REDIRECTION_SERVICE_API_KEY, ENV_REDIRECTION_SERVICE_ENABLED
            ),
        })?;

    let endpoint = Url::parse(&settings.endpoint).map_err(|e| ClientError::InvalidAddress {
        url: settings.endpoint.clone(),
        reason: e.to_string(),
    })?;

    tracing::info!(
        address,
        endpoint = %endpoint,
        "routing Octopus requests through the redirection service"
    );
    Ok(Arc::new(RedirectingTransport::new(
        client,
        endpoint,
        api_key,
    )?))
}

fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
