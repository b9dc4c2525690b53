//! Octopus API resource models
//!
//! Field names follow the Octopus REST API (PascalCase JSON).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod account;
mod environment;
mod feed;
mod lifecycle;
mod library_variable_set;
mod project;
mod project_group;
mod space;
mod team;
mod tenant;
mod variable;

pub use account::{Account, AccountType};
pub use environment::Environment;
pub use feed::{Feed, FeedType};
pub use lifecycle::{
    Lifecycle, Phase, RetentionPeriod, RetentionStrategy, RetentionType, RetentionUnit,
    SpaceDefaultRetentionPolicy,
};
pub use library_variable_set::LibraryVariableSet;
pub use project::{GuidedFailureMode, Project};
pub use project_group::ProjectGroup;
pub use space::Space;
pub use team::{ExternalSecurityGroup, ScopedUserRole, Team};
pub use tenant::Tenant;
pub use variable::{Variable, VariablePrompt, VariableScope, VariableSet};

/// Where a resource collection lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `/api/{spaceId}/{collection}`
    Space,
    /// `/api/{collection}`
    System,
}

/// A resource addressable through the Octopus REST API
pub trait ApiResource: Serialize + DeserializeOwned + Send + Sync {
    /// Human-readable resource kind, used in errors
    const KIND: &'static str;

    /// Collection path segment
    const COLLECTION: &'static str;

    /// Collection scope
    const SCOPE: Scope;

    /// Server-assigned ID, if the resource exists
    fn id(&self) -> Option<&str>;
}

/// One page of a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resources<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub items_per_page: u32,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub number_of_pages: u32,
    #[serde(default)]
    pub last_page_number: u32,
}

/// Write-only secret as exchanged with the API
///
/// The server reports `HasValue` but never returns the secret itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SensitiveValue {
    #[serde(default)]
    pub has_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl SensitiveValue {
    /// A value to be written
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            has_value: true,
            new_value: Some(value.into()),
        }
    }

    /// Wrap an optional secret
    pub fn from_option(value: Option<&str>) -> Option<Self> {
        value.map(Self::new)
    }
}

/// How a resource participates in tenanted deployments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantedDeploymentMode {
    #[default]
    Untenanted,
    TenantedOrUntenanted,
    Tenanted,
}

impl TenantedDeploymentMode {
    pub const VALUES: &'static [&'static str] = &["Untenanted", "TenantedOrUntenanted", "Tenanted"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Untenanted => "Untenanted",
            Self::TenantedOrUntenanted => "TenantedOrUntenanted",
            Self::Tenanted => "Tenanted",
        }
    }

    /// Parse the API spelling
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Untenanted" => Some(Self::Untenanted),
            "TenantedOrUntenanted" => Some(Self::TenantedOrUntenanted),
            "Tenanted" => Some(Self::Tenanted),
            _ => None,
        }
    }
}

impl std::fmt::Display for TenantedDeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub ids: Vec<String>,
    pub partial_name: Option<String>,
    pub skip: Option<u32>,
    pub take: Option<u32>,
    /// Type-specific filters (`feedType`, `retentionType`, ...)
    pub filters: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partial_name(mut self, name: impl Into<String>) -> Self {
        self.partial_name = Some(name.into());
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u32) -> Self {
        self.take = Some(take);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Query-string pairs in the order the API documents them
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.ids.is_empty() {
            pairs.push(("ids".to_string(), self.ids.join(",")));
        }
        if let Some(name) = &self.partial_name {
            pairs.push(("partialName".to_string(), name.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(take) = self.take {
            pairs.push(("take".to_string(), take.to_string()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_pairs() {
        let query = SearchQuery::new()
            .ids(["Environments-1", "Environments-2"])
            .partial_name("Prod")
            .skip(10)
            .take(5)
            .filter("feedType", "Docker");

        assert_eq!(
            query.to_pairs(),
            vec![
                ("ids".to_string(), "Environments-1,Environments-2".to_string()),
                ("partialName".to_string(), "Prod".to_string()),
                ("skip".to_string(), "10".to_string()),
                ("take".to_string(), "5".to_string()),
                ("feedType".to_string(), "Docker".to_string()),
            ]
        );
        assert!(SearchQuery::new().to_pairs().is_empty());
    }

    #[test]
    fn test_resources_page_parses_with_missing_fields() {
        let page: Resources<Environment> =
            serde_json::from_str(r#"{"Items":[{"Id":"Environments-1","Name":"Dev"}],"TotalResults":1}"#)
                .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_results, 1);
        assert_eq!(page.items_per_page, 0);
    }

    #[test]
    fn test_sensitive_value_serialization() {
        let json = serde_json::to_value(SensitiveValue::new("s3cret")).unwrap();
        assert_eq!(json, serde_json::json!({"HasValue": true, "NewValue": "s3cret"}));

        let from_server: SensitiveValue = serde_json::from_str(r#"{"HasValue":true}"#).unwrap();
        assert!(from_server.has_value);
        assert!(from_server.new_value.is_none());
    }

    #[test]
    fn test_tenanted_deployment_mode_parse() {
        for value in TenantedDeploymentMode::VALUES {
            let mode = TenantedDeploymentMode::parse(value).unwrap();
            assert_eq!(mode.as_str(), *value);
        }
        assert!(TenantedDeploymentMode::parse("tenanted").is_none());
    }
}
