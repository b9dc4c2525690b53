//! Octopus Deploy API client
//!
//! This crate provides the REST client used by the Octopus Deploy Terraform
//! provider:
//!
//! - **Typed models**: environments, projects, lifecycles, teams, feeds,
//!   accounts, variables, tenants, spaces and retention policies
//! - **Generic CRUD**: one client API for every resource collection,
//!   space-scoped or system-wide
//! - **Transports**: direct, or through the redirection service when
//!   `REDIRECTION_SERVICE_ENABLED=true`
//!
//! ## Example
//!
//! ```rust,no_run
//! use octopusdeploy_client::{ClientConfig, Credentials, OctopusClient, RedirectionSettings};
//! use octopusdeploy_client::models::{Environment, SearchQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://example.octopus.app", Credentials::api_key("API-XXXX"))?
//!     .with_space_id("Spaces-1");
//! let client = OctopusClient::new(config, &RedirectionSettings::from_env())?;
//!
//! let page = client
//!     .list::<Environment>(None, &SearchQuery::new().partial_name("Prod"))
//!     .await?;
//! println!("{} environments", page.total_results);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;

pub use client::OctopusClient;
pub use config::{ClientConfig, Credentials};
pub use error::{ClientError, Result};
pub use transport::{
    DirectTransport, RedirectingTransport, RedirectionSettings, Transport,
    is_directly_accessible_octopus_instance,
};
