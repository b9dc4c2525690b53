//! Client configuration and credentials
//!
//! An Octopus server is addressed by its base URL and authenticated either
//! with an API key (`X-Octopus-ApiKey`) or an access token (`Bearer`).

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, Result};

/// Environment variable holding the Octopus server URL
pub const ENV_OCTOPUS_URL: &str = "OCTOPUS_URL";

/// Environment variable holding the API key
pub const ENV_OCTOPUS_APIKEY: &str = "OCTOPUS_APIKEY";

/// Environment variable holding the access token
pub const ENV_OCTOPUS_ACCESS_TOKEN: &str = "OCTOPUS_ACCESS_TOKEN";

/// Environment variable holding the default space ID
pub const ENV_OCTOPUS_SPACE_ID: &str = "OCTOPUS_SPACE_ID";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// Credential types supported by the Octopus API
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// API key authentication
    ApiKey { api_key: String },

    /// Access token (OIDC) authentication
    AccessToken { access_token: String },
}

impl Credentials {
    /// Create API key credentials
    pub fn api_key(api_key: impl Into<String>) -> Self {
        Credentials::ApiKey {
            api_key: api_key.into(),
        }
    }

    /// Create access token credentials
    pub fn access_token(access_token: impl Into<String>) -> Self {
        Credentials::AccessToken {
            access_token: access_token.into(),
        }
    }

    /// Pick credentials from an API key and an access token.
    ///
    /// Exactly one of the two must be non-empty.
    pub fn from_parts(api_key: Option<&str>, access_token: Option<&str>) -> Result<Self> {
        let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
        let access_token = access_token.map(str::trim).filter(|t| !t.is_empty());

        match (api_key, access_token) {
            (Some(key), None) => Ok(Credentials::api_key(key)),
            (None, Some(token)) => Ok(Credentials::access_token(token)),
            (Some(_), Some(_)) => Err(ClientError::InvalidConfig {
                message: "only one of api_key or access_token may be set".to_string(),
            }),
            (None, None) => Err(ClientError::InvalidConfig {
                message: "one of api_key or access_token must be set".to_string(),
            }),
        }
    }

    /// Header name and value used to authenticate a request
    pub fn auth_header(&self) -> (&'static str, String) {
        match self {
            Credentials::ApiKey { api_key } => (API_KEY_HEADER, api_key.clone()),
            Credentials::AccessToken { access_token } => {
                ("Authorization", format!("Bearer {}", access_token))
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey { .. } => f.write_str("ApiKey(***)"),
            Credentials::AccessToken { .. } => f.write_str("AccessToken(***)"),
        }
    }
}

/// Connection settings for an Octopus server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the Octopus server
    pub address: Url,

    /// Authentication
    pub credentials: Credentials,

    /// Space used when a request does not name one
    pub space_id: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl ClientConfig {
    /// Create a configuration for a server address
    pub fn new(address: &str, credentials: Credentials) -> Result<Self> {
        let address = parse_address(address)?;
        Ok(Self {
            address,
            credentials,
            space_id: None,
            timeout_seconds: 60,
        })
    }

    /// Set the default space
    pub fn with_space_id(mut self, space_id: impl Into<String>) -> Self {
        let space_id = space_id.into();
        self.space_id = if space_id.trim().is_empty() {
            None
        } else {
            Some(space_id)
        };
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let secret = match &self.credentials {
            Credentials::ApiKey { api_key } => api_key,
            Credentials::AccessToken { access_token } => access_token,
        };
        if secret.trim().is_empty() {
            return Err(ClientError::InvalidConfig {
                message: "one of api_key or access_token must be set".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ClientError::InvalidConfig {
                message: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// Build a configuration from the `OCTOPUS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let address = std::env::var(ENV_OCTOPUS_URL).map_err(|_| ClientError::InvalidConfig {
            message: format!("Environment variable {} not set", ENV_OCTOPUS_URL),
        })?;
        let api_key = std::env::var(ENV_OCTOPUS_APIKEY).ok();
        let access_token = std::env::var(ENV_OCTOPUS_ACCESS_TOKEN).ok();
        let credentials = Credentials::from_parts(api_key.as_deref(), access_token.as_deref())?;

        let mut config = Self::new(&address, credentials)?;
        if let Ok(space_id) = std::env::var(ENV_OCTOPUS_SPACE_ID) {
            config = config.with_space_id(space_id);
        }
        Ok(config)
    }
}

/// Parse and check a server address
pub fn parse_address(address: &str) -> Result<Url> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidAddress {
            url: address.to_string(),
            reason: "address must not be empty".to_string(),
        });
    }

    let url = Url::parse(trimmed).map_err(|e| ClientError::InvalidAddress {
        url: address.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidAddress {
            url: address.to_string(),
            reason: format!("unsupported scheme '{}', expected http or https", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_parts() {
        assert_eq!(
            Credentials::from_parts(Some("API-123"), None).unwrap(),
            Credentials::api_key("API-123")
        );
        assert_eq!(
            Credentials::from_parts(Some("  "), Some("token")).unwrap(),
            Credentials::access_token("token")
        );
        assert!(Credentials::from_parts(Some("API-123"), Some("token")).is_err());
        assert!(Credentials::from_parts(None, None).is_err());
        assert!(Credentials::from_parts(Some(""), Some("")).is_err());
    }

    #[test]
    fn test_auth_header() {
        let (name, value) = Credentials::api_key("API-XYZ").auth_header();
        assert_eq!(name, "X-Octopus-ApiKey");
        assert_eq!(value, "API-XYZ");

        let (name, value) = Credentials::access_token("abc").auth_header();
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer abc");
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let debug = format!("{:?}", Credentials::api_key("API-SECRET"));
        assert!(!debug.contains("SECRET"));
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("https://example.octopus.app").is_ok());
        assert!(parse_address("http://localhost:8080/").is_ok());
        assert!(parse_address("").is_err());
        assert!(parse_address("ftp://example.com").is_err());
        assert!(parse_address("not a url").is_err());
    }

    #[test]
    fn test_with_space_id() {
        let config = ClientConfig::new("https://example.octopus.app", Credentials::api_key("k"))
            .unwrap()
            .with_space_id("Spaces-1");
        assert_eq!(config.space_id.as_deref(), Some("Spaces-1"));

        let config = config.with_space_id("");
        assert!(config.space_id.is_none());
    }

    #[test]
    fn test_validate() {
        let config = ClientConfig::new("https://example.octopus.app", Credentials::api_key("API-1")).unwrap();
        assert!(config.validate().is_ok());

        let config = ClientConfig::new("https://example.octopus.app", Credentials::access_token(" ")).unwrap();
        assert!(config.validate().is_err());
    }
}
