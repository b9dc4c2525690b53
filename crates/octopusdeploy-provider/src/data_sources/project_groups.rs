//! `octopusdeploy_project_groups`

use octopusdeploy_client::models::ProjectGroup;
use octopusdeploy_framework::AttrType;

use super::{SearchModel, object_type};
use crate::resources::ResourceModel;
use crate::resources::project_group::ProjectGroupModel;

pub struct ProjectGroups;

impl SearchModel for ProjectGroups {
    type Api = ProjectGroup;
    type Item = ProjectGroupModel;

    const TYPE_NAME: &'static str = "octopusdeploy_project_groups";
    const RESULTS: &'static str = "project_groups";
    const KIND: &'static str = "project groups";

    fn item_type() -> AttrType {
        object_type(&[
            ("id", AttrType::String),
            ("name", AttrType::String),
            ("description", AttrType::String),
            ("space_id", AttrType::String),
        ])
    }

    fn item(api: &ProjectGroup) -> ProjectGroupModel {
        ProjectGroupModel::flatten(api)
    }
}
