//! Conversions between framework values, models and diagnostics

use octopusdeploy_client::ClientError;
use octopusdeploy_framework::{AttributePath, Diagnostics, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Report a failed API call
pub fn api_error(diags: &mut Diagnostics, action: &str, kind: &str, error: &ClientError) {
    diags.add_error(format!("Error {} {}", action, kind), error.to_string());
}

/// Decode a plan, state or configuration value into a model
pub fn decode<T: DeserializeOwned>(diags: &mut Diagnostics, value: &Value) -> Option<T> {
    match value.decode() {
        Ok(model) => Some(model),
        Err(e) => {
            diags.add_error("Invalid resource data", e.to_string());
            None
        }
    }
}

/// Encode a model as state
pub fn encode<T: Serialize>(diags: &mut Diagnostics, model: &T) -> Option<Value> {
    match Value::encode(model) {
        Ok(value) => Some(value),
        Err(e) => {
            diags.add_error("Cannot encode resource state", e.to_string());
            None
        }
    }
}

/// `None` for empty strings, which Terraform stores as null
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Largest integer the Octopus API stores (a 32-bit field)
pub const MAX_API_INT: i64 = i32::MAX as i64;

/// Convert a validated attribute to the API's 32-bit integer, saturating
/// at the bounds
pub fn api_int(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Convert an attribute to a 32-bit integer or report it at `attribute`
pub fn checked_api_int(diags: &mut Diagnostics, attribute: &str, value: i64) -> Option<i32> {
    match i32::try_from(value) {
        Ok(n) => Some(n),
        Err(_) => {
            diags.add_attribute_error(
                AttributePath::new(attribute),
                "Value out of range",
                format!("{} must be between 0 and {}, got: {}", attribute, MAX_API_INT, value),
            );
            None
        }
    }
}

/// Paging parameter; negative values become 0
pub fn page_param(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Seconds since the epoch, used as the ID of data source results
pub fn timestamp_id() -> String {
    chrono::Utc::now().timestamp().to_string()
}
