//! Octopus Deploy Terraform provider
//!
//! Maps Octopus Deploy entities onto Terraform resources and data sources.
//! Each resource declares a schema, expands Terraform values into API
//! objects, calls the Octopus client and flattens the response back into
//! state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use octopusdeploy_framework::{ProviderServer, Value};
//! use octopusdeploy_provider::OctopusDeployProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ProviderServer::new(Arc::new(OctopusDeployProvider::new()));
//! let configured = server
//!     .configure(&Value::object([
//!         ("address", Value::from("https://example.octopus.app")),
//!         ("api_key", Value::from("API-XXXX")),
//!     ]))
//!     .await;
//! assert!(!configured.diagnostics.has_errors());
//! # Ok(())
//! # }
//! ```

pub mod data_sources;
pub mod deprecations;
pub mod provider;
pub mod resources;
pub mod retention;
pub mod schemas;
pub mod util;

pub use deprecations::{DeprecationReversals, is_deprecated_resource_enabled};
pub use provider::{OctopusDeployProvider, PROVIDER_TYPE_NAME, ProviderConfigModel, ProviderData};
