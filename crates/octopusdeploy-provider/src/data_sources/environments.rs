//! `octopusdeploy_environments`

use octopusdeploy_client::models::Environment;
use octopusdeploy_framework::AttrType;

use super::{SearchModel, object_type};
use crate::resources::ResourceModel;
use crate::resources::environment::EnvironmentModel;

pub struct Environments;

impl SearchModel for Environments {
    type Api = Environment;
    type Item = EnvironmentModel;

    const TYPE_NAME: &'static str = "octopusdeploy_environments";
    const RESULTS: &'static str = "environments";
    const KIND: &'static str = "environments";

    fn item_type() -> AttrType {
        object_type(&[
            ("id", AttrType::String),
            ("name", AttrType::String),
            ("slug", AttrType::String),
            ("description", AttrType::String),
            ("sort_order", AttrType::Int64),
            ("use_guided_failure", AttrType::Bool),
            ("allow_dynamic_infrastructure", AttrType::Bool),
            ("space_id", AttrType::String),
        ])
    }

    fn item(api: &Environment) -> EnvironmentModel {
        EnvironmentModel::flatten(api)
    }
}
