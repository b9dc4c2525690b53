//! Error types for Octopus API operations

use thiserror::Error;

/// Octopus API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    // ============ Configuration Errors ============
    #[error("Invalid Octopus server address: {url} - {reason}")]
    InvalidAddress { url: String, reason: String },

    #[error("Invalid client configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Network Errors ============
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    // ============ Authentication Errors ============
    #[error("Authentication required for {url}")]
    AuthRequired { url: String },

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    // ============ API Errors ============
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Octopus API error ({status}): {message}{}", format_details(.details))]
    Api {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    // ============ Other ============
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}

fn format_details(details: &[String]) -> String {
    if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join("; "))
    }
}

impl ClientError {
    /// Whether the error means the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Result type for Octopus API operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout { seconds: 60 }
        } else if e.is_connect() {
            ClientError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if e.is_decode() {
            ClientError::Serialization(e.to_string())
        } else {
            ClientError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::InvalidAddress {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_details() {
        let err = ClientError::Api {
            status: 400,
            message: "There was a problem with your request.".to_string(),
            details: vec![
                "Name must be unique".to_string(),
                "Slug is invalid".to_string(),
            ],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"Octopus API error (400): There was a problem with your request. (Name must be unique; Slug is invalid)"
        );
    }

    #[test]
    fn test_api_error_display_without_details() {
        let err = ClientError::Api {
            status: 500,
            message: "boom".to_string(),
            details: vec![],
        };
        assert_eq!(err.to_string(), "Octopus API error (500): boom");
    }

    #[test]
    fn test_is_not_found() {
        let err = ClientError::NotFound {
            kind: "Environment".to_string(),
            id: "Environments-1".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Environment not found: Environments-1");
        assert!(!ClientError::Other("x".into()).is_not_found());
    }
}
