//! `octopusdeploy_project_group`

use octopusdeploy_client::models::ProjectGroup;
use octopusdeploy_framework::Schema;
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::{schemas, util};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectGroupModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
}

impl ResourceModel for ProjectGroupModel {
    type Api = ProjectGroup;

    const TYPE_NAME: &'static str = "octopusdeploy_project_group";
    const KIND: &'static str = "project group";

    fn schema() -> Schema {
        Schema::new("This resource manages project groups in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("project group"))
            .attribute("description", schemas::description("project group"))
            .attribute("space_id", schemas::space_id("project group"))
    }

    fn expand(&self) -> ProjectGroup {
        ProjectGroup {
            id: self.id.clone(),
            name: self.name.clone(),
            description: util::non_empty(&self.description),
            space_id: self.space_id.clone(),
        }
    }

    fn flatten(api: &ProjectGroup) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let groups = [
            ProjectGroup {
                id: Some("ProjectGroups-2".to_string()),
                name: "Web".to_string(),
                description: Some("Front end projects".to_string()),
                space_id: Some("Spaces-1".to_string()),
            },
            ProjectGroup {
                name: "Empty".to_string(),
                ..Default::default()
            },
        ];
        for group in groups {
            assert_eq!(ProjectGroupModel::flatten(&group).expand(), group);
        }
    }
}
