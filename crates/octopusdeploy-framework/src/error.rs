//! Framework error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("Value is not fully known at {path}")]
    UnknownValue { path: String },

    #[error("Cannot decode value: {0}")]
    Decode(String),

    #[error("Cannot encode value: {0}")]
    Encode(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Unknown resource type: {name}")]
    UnknownResourceType { name: String },

    #[error("Unknown data source: {name}")]
    UnknownDataSource { name: String },
}

pub type Result<T> = std::result::Result<T, FrameworkError>;
