//! CLI error type
//!
//! Every failure the binary reports maps to one exit code.

use miette::Diagnostic;
use octopusdeploy_framework::FrameworkError;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration rejected by the resource schema or validators
    #[error("Validation failed: {message}")]
    #[diagnostic(code(octopusdeploy::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The provider returned error diagnostics
    #[error("{operation} failed with {errors} error(s)")]
    #[diagnostic(code(octopusdeploy::cli::provider))]
    Provider { operation: String, errors: usize },

    /// Settings, config or state file problems
    #[error("Configuration error: {message}")]
    #[diagnostic(code(octopusdeploy::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Resource type or data source the provider does not serve
    #[error("Unknown {kind}: {name}")]
    #[diagnostic(code(octopusdeploy::cli::unknown_type))]
    UnknownType {
        kind: &'static str,
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(octopusdeploy::cli::io))]
    Io { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(octopusdeploy::cli::internal))]
    Internal { message: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Provider { .. } => exit_codes::PROVIDER_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::UnknownType { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn validation(errors: usize) -> Self {
        Self::Validation {
            message: format!("{} error(s) in the configuration", errors),
            help: None,
        }
    }

    pub fn provider(operation: impl Into<String>, errors: usize) -> Self {
        Self::Provider {
            operation: operation.into(),
            errors,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<FrameworkError> for CliError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::UnknownResourceType { name } => CliError::UnknownType {
                kind: "resource type",
                name,
                help: None,
            },
            FrameworkError::UnknownDataSource { name } => CliError::UnknownType {
                kind: "data source",
                name,
                help: None,
            },
            other => CliError::internal(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation(2).exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(CliError::provider("Apply", 1).exit_code(), exit_codes::PROVIDER_ERROR);
        assert_eq!(CliError::config("bad").exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(CliError::internal("boom").exit_code(), exit_codes::ERROR);
        let io: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.exit_code(), exit_codes::IO_ERROR);
    }

    #[test]
    fn test_unknown_type_from_framework_error() {
        let err: CliError = FrameworkError::UnknownResourceType {
            name: "octopusdeploy_widget".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
        assert_eq!(err.to_string(), "Unknown resource type: octopusdeploy_widget");
    }

    #[test]
    fn test_provider_message() {
        assert_eq!(
            CliError::provider("Apply", 2).to_string(),
            "Apply failed with 2 error(s)"
        );
    }
}
