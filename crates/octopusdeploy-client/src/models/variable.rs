use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// Scope restricting where a variable value applies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableScope {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machine: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tenant_tag: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub process_owner: Vec<String>,
}

impl VariableScope {
    pub fn is_empty(&self) -> bool {
        self.environment.is_empty()
            && self.machine.is_empty()
            && self.role.is_empty()
            && self.channel.is_empty()
            && self.action.is_empty()
            && self.tenant_tag.is_empty()
            && self.process_owner.is_empty()
    }
}

/// Prompt shown when a release is deployed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariablePrompt {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A single variable inside a variable set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "Type", default = "default_variable_type")]
    pub variable_type: String,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default = "default_true")]
    pub is_editable: bool,
    #[serde(default)]
    pub scope: VariableScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<VariablePrompt>,
}

fn default_variable_type() -> String {
    "String".to_string()
}

fn default_true() -> bool {
    true
}

/// All variables owned by a project or library variable set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl VariableSet {
    pub fn find(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id.as_deref() == Some(id))
    }
}

impl ApiResource for VariableSet {
    const KIND: &'static str = "Variable set";
    const COLLECTION: &'static str = "variables";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_type_field_name() {
        let variable: Variable = serde_json::from_str(
            r#"{"Id":"v1","Name":"Password","Value":null,"Type":"Sensitive","IsSensitive":true,
                "Scope":{"Environment":["Environments-1"]}}"#,
        )
        .unwrap();
        assert_eq!(variable.variable_type, "Sensitive");
        assert!(variable.is_editable);
        assert_eq!(variable.scope.environment, vec!["Environments-1"]);
        assert!(!variable.scope.is_empty());
    }

    #[test]
    fn test_empty_scope_serializes_as_empty_object() {
        let json = serde_json::to_value(VariableScope::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
