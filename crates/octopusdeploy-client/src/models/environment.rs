use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// A deployment environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub use_guided_failure: bool,
    #[serde(default)]
    pub allow_dynamic_infrastructure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl ApiResource for Environment {
    const KIND: &'static str = "Environment";
    const COLLECTION: &'static str = "environments";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
