use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// A variable set shared between projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LibraryVariableSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_set_id: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "Variables".to_string()
}

impl Default for LibraryVariableSet {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            space_id: None,
            variable_set_id: None,
            content_type: default_content_type(),
        }
    }
}

impl ApiResource for LibraryVariableSet {
    const KIND: &'static str = "Library variable set";
    const COLLECTION: &'static str = "libraryvariablesets";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
