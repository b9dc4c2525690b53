//! `octopusdeploy_tenant`

use octopusdeploy_client::models::Tenant;
use octopusdeploy_framework::{AttrType, Attribute, Block, Schema};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::{schemas, util};

/// Environments of one project the tenant is connected to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEnvironmentModel {
    pub project_id: String,
    pub environments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub tenant_tags: Vec<String>,
    pub is_disabled: bool,
    pub project_environment: Vec<ProjectEnvironmentModel>,
}

impl ResourceModel for TenantModel {
    type Api = Tenant;

    const TYPE_NAME: &'static str = "octopusdeploy_tenant";
    const KIND: &'static str = "tenant";

    fn schema() -> Schema {
        Schema::new("This resource manages tenants in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("tenant"))
            .attribute("description", schemas::description("tenant"))
            .attribute("space_id", schemas::space_id("tenant"))
            .attribute(
                "tenant_tags",
                schemas::string_set("Canonical names of the tags applied to this tenant."),
            )
            .attribute("is_disabled", schemas::flag("Whether the tenant is disabled.", false))
            .block(
                "project_environment",
                Block::set(
                    Schema::new("A project the tenant is connected to, and the environments it deploys to.")
                        .attribute(
                            "project_id",
                            Attribute::required(AttrType::String).description("The project ID."),
                        )
                        .attribute(
                            "environments",
                            Attribute::required(AttrType::set_of(AttrType::String))
                                .description("IDs of the environments of the project."),
                        ),
                ),
            )
    }

    fn expand(&self) -> Tenant {
        Tenant {
            id: self.id.clone(),
            name: self.name.clone(),
            description: util::non_empty(&self.description),
            space_id: self.space_id.clone(),
            tenant_tags: self.tenant_tags.clone(),
            is_disabled: self.is_disabled,
            project_environments: self
                .project_environment
                .iter()
                .map(|pe| (pe.project_id.clone(), pe.environments.clone()))
                .collect(),
        }
    }

    fn flatten(api: &Tenant) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            tenant_tags: api.tenant_tags.clone(),
            is_disabled: api.is_disabled,
            project_environment: api
                .project_environments
                .iter()
                .map(|(project_id, environments)| ProjectEnvironmentModel {
                    project_id: project_id.clone(),
                    environments: environments.clone(),
                })
                .collect(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }
}
