use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// A tenant and the project environments it is connected to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tenant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub tenant_tags: Vec<String>,
    #[serde(default)]
    pub is_disabled: bool,
    /// Project ID to environment IDs
    #[serde(default)]
    pub project_environments: BTreeMap<String, Vec<String>>,
}

impl ApiResource for Tenant {
    const KIND: &'static str = "Tenant";
    const COLLECTION: &'static str = "tenants";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
