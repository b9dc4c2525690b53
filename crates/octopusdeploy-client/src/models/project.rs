use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope, TenantedDeploymentMode};

/// What happens when a deployment step fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidedFailureMode {
    #[default]
    EnvironmentDefault,
    Off,
    On,
}

impl GuidedFailureMode {
    pub const VALUES: &'static [&'static str] = &["EnvironmentDefault", "Off", "On"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnvironmentDefault => "EnvironmentDefault",
            Self::Off => "Off",
            Self::On => "On",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EnvironmentDefault" => Some(Self::EnvironmentDefault),
            "Off" => Some(Self::Off),
            "On" => Some(Self::On),
            _ => None,
        }
    }
}

/// A deployable project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub lifecycle_id: String,
    pub project_group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub auto_create_release: bool,
    #[serde(default)]
    pub default_guided_failure_mode: GuidedFailureMode,
    #[serde(default)]
    pub default_to_skip_if_already_installed: bool,
    #[serde(default)]
    pub discrete_channel_release: bool,
    #[serde(default)]
    pub tenanted_deployment_mode: TenantedDeploymentMode,
    #[serde(default)]
    pub included_library_variable_set_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_set_id: Option<String>,
    #[serde(default)]
    pub is_version_controlled: bool,
}

impl ApiResource for Project {
    const KIND: &'static str = "Project";
    const COLLECTION: &'static str = "projects";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
