//! `octopusdeploy_project`

use octopusdeploy_client::models::{GuidedFailureMode, Project, TenantedDeploymentMode};
use octopusdeploy_framework::{AttrType, Attribute, Schema, UseStateForUnknown};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::{schemas, util};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectModel {
    pub id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub lifecycle_id: String,
    pub project_group_id: String,
    pub space_id: Option<String>,
    pub is_disabled: bool,
    pub auto_create_release: bool,
    pub default_guided_failure_mode: String,
    pub default_to_skip_if_already_installed: bool,
    pub discrete_channel_release: bool,
    pub tenanted_deployment_participation: String,
    pub included_library_variable_sets: Vec<String>,
    pub deployment_process_id: Option<String>,
    pub variable_set_id: Option<String>,
}

fn computed_id(description: &str) -> Attribute {
    Attribute::computed(AttrType::String)
        .description(description)
        .plan_modifier(UseStateForUnknown)
}

impl ResourceModel for ProjectModel {
    type Api = Project;

    const TYPE_NAME: &'static str = "octopusdeploy_project";
    const KIND: &'static str = "project";

    fn schema() -> Schema {
        Schema::new("This resource manages projects in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("project"))
            .attribute("slug", schemas::slug("project"))
            .attribute("description", schemas::description("project"))
            .attribute(
                "lifecycle_id",
                Attribute::required(AttrType::String)
                    .description("The lifecycle ID associated with this project."),
            )
            .attribute(
                "project_group_id",
                Attribute::required(AttrType::String)
                    .description("The project group ID associated with this project."),
            )
            .attribute("space_id", schemas::space_id("project"))
            .attribute("is_disabled", schemas::flag("Disable deployments of this project.", false))
            .attribute(
                "auto_create_release",
                schemas::flag("Create a release when a package is pushed.", false),
            )
            .attribute(
                "default_guided_failure_mode",
                schemas::enumeration(
                    "The default guided failure mode for deployments of this project.",
                    GuidedFailureMode::VALUES,
                    GuidedFailureMode::EnvironmentDefault.as_str(),
                ),
            )
            .attribute(
                "default_to_skip_if_already_installed",
                schemas::flag("Skip packages that are already installed.", false),
            )
            .attribute(
                "discrete_channel_release",
                schemas::flag("Treat releases of different channels as distinct.", false),
            )
            .attribute(
                "tenanted_deployment_participation",
                schemas::tenanted_deployment_participation(),
            )
            .attribute(
                "included_library_variable_sets",
                schemas::string_list("IDs of the library variable sets included in this project."),
            )
            .attribute(
                "deployment_process_id",
                computed_id("The deployment process ID of this project."),
            )
            .attribute("variable_set_id", computed_id("The variable set ID of this project."))
    }

    fn expand(&self) -> Project {
        Project {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: util::non_empty(&self.description),
            lifecycle_id: self.lifecycle_id.clone(),
            project_group_id: self.project_group_id.clone(),
            space_id: self.space_id.clone(),
            is_disabled: self.is_disabled,
            auto_create_release: self.auto_create_release,
            default_guided_failure_mode: GuidedFailureMode::parse(&self.default_guided_failure_mode)
                .unwrap_or_default(),
            default_to_skip_if_already_installed: self.default_to_skip_if_already_installed,
            discrete_channel_release: self.discrete_channel_release,
            tenanted_deployment_mode: TenantedDeploymentMode::parse(
                &self.tenanted_deployment_participation,
            )
            .unwrap_or_default(),
            included_library_variable_set_ids: self.included_library_variable_sets.clone(),
            deployment_process_id: self.deployment_process_id.clone(),
            variable_set_id: self.variable_set_id.clone(),
            is_version_controlled: false,
        }
    }

    fn flatten(api: &Project) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            slug: api.slug.clone(),
            description: api.description.clone().unwrap_or_default(),
            lifecycle_id: api.lifecycle_id.clone(),
            project_group_id: api.project_group_id.clone(),
            space_id: api.space_id.clone(),
            is_disabled: api.is_disabled,
            auto_create_release: api.auto_create_release,
            default_guided_failure_mode: api.default_guided_failure_mode.as_str().to_string(),
            default_to_skip_if_already_installed: api.default_to_skip_if_already_installed,
            discrete_channel_release: api.discrete_channel_release,
            tenanted_deployment_participation: api.tenanted_deployment_mode.as_str().to_string(),
            included_library_variable_sets: api.included_library_variable_set_ids.clone(),
            deployment_process_id: api.deployment_process_id.clone(),
            variable_set_id: api.variable_set_id.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }
}
