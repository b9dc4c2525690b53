//! `octopusdeploy_library_variable_set`

use octopusdeploy_client::models::LibraryVariableSet;
use octopusdeploy_framework::{AttrType, Attribute, Schema, UseStateForUnknown};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::{schemas, util};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryVariableSetModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub variable_set_id: Option<String>,
}

impl ResourceModel for LibraryVariableSetModel {
    type Api = LibraryVariableSet;

    const TYPE_NAME: &'static str = "octopusdeploy_library_variable_set";
    const KIND: &'static str = "library variable set";

    fn schema() -> Schema {
        Schema::new("This resource manages library variable sets in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("library variable set"))
            .attribute("description", schemas::description("library variable set"))
            .attribute("space_id", schemas::space_id("library variable set"))
            .attribute(
                "variable_set_id",
                Attribute::computed(AttrType::String)
                    .description("The ID of the variable set holding this library's variables.")
                    .plan_modifier(UseStateForUnknown),
            )
    }

    fn expand(&self) -> LibraryVariableSet {
        LibraryVariableSet {
            id: self.id.clone(),
            name: self.name.clone(),
            description: util::non_empty(&self.description),
            space_id: self.space_id.clone(),
            variable_set_id: self.variable_set_id.clone(),
            ..Default::default()
        }
    }

    fn flatten(api: &LibraryVariableSet) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
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
