//! `octopusdeploy_environment`

use octopusdeploy_client::models::Environment;
use octopusdeploy_framework::validators::between;
use octopusdeploy_framework::{AttrType, Attribute, Schema};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::{schemas, util};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentModel {
    pub id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub sort_order: Option<i64>,
    pub use_guided_failure: bool,
    pub allow_dynamic_infrastructure: bool,
    pub space_id: Option<String>,
}

impl ResourceModel for EnvironmentModel {
    type Api = Environment;

    const TYPE_NAME: &'static str = "octopusdeploy_environment";
    const KIND: &'static str = "environment";

    fn schema() -> Schema {
        Schema::new("This resource manages environments in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("environment"))
            .attribute("slug", schemas::slug("environment"))
            .attribute("description", schemas::description("environment"))
            .attribute(
                "sort_order",
                Attribute::optional_computed(AttrType::Int64)
                    .description("The order of this environment relative to other environments.")
                    .validator(between(0, util::MAX_API_INT)),
            )
            .attribute(
                "use_guided_failure",
                schemas::flag("Prompt for manual intervention when a deployment fails.", false),
            )
            .attribute(
                "allow_dynamic_infrastructure",
                schemas::flag("Allow deployment targets to be registered dynamically.", false),
            )
            .attribute("space_id", schemas::space_id("environment"))
    }

    fn expand(&self) -> Environment {
        Environment {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: util::non_empty(&self.description),
            sort_order: util::api_int(self.sort_order.unwrap_or(0)),
            use_guided_failure: self.use_guided_failure,
            allow_dynamic_infrastructure: self.allow_dynamic_infrastructure,
            space_id: self.space_id.clone(),
        }
    }

    fn flatten(api: &Environment) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            slug: api.slug.clone(),
            description: api.description.clone().unwrap_or_default(),
            sort_order: Some(i64::from(api.sort_order)),
            use_guided_failure: api.use_guided_failure,
            allow_dynamic_infrastructure: api.allow_dynamic_infrastructure,
            space_id: api.space_id.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }
}
