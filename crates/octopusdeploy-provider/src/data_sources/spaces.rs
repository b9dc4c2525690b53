//! `octopusdeploy_spaces`

use octopusdeploy_client::models::Space;
use octopusdeploy_framework::AttrType;

use super::{SearchModel, object_type};
use crate::resources::ResourceModel;
use crate::resources::space::SpaceModel;

pub struct Spaces;

impl SearchModel for Spaces {
    type Api = Space;
    type Item = SpaceModel;

    const TYPE_NAME: &'static str = "octopusdeploy_spaces";
    const RESULTS: &'static str = "spaces";
    const KIND: &'static str = "spaces";
    const SPACE_SCOPED: bool = false;

    fn item_type() -> AttrType {
        object_type(&[
            ("id", AttrType::String),
            ("name", AttrType::String),
            ("slug", AttrType::String),
            ("description", AttrType::String),
            ("is_default", AttrType::Bool),
            ("is_task_queue_stopped", AttrType::Bool),
            ("space_managers_teams", AttrType::set_of(AttrType::String)),
            ("space_managers_team_members", AttrType::set_of(AttrType::String)),
        ])
    }

    fn item(api: &Space) -> SpaceModel {
        SpaceModel::flatten(api)
    }
}
