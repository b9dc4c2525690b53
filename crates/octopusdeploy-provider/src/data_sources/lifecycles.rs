//! `octopusdeploy_lifecycles`

use octopusdeploy_client::models::{Lifecycle, Phase};
use octopusdeploy_framework::AttrType;
use serde::Serialize;

use super::{SearchModel, object_type};
use crate::retention::{RetentionModel, flatten_retention_block};

/// One phase of a found lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseItem {
    pub id: Option<String>,
    pub name: String,
    pub automatic_deployment_targets: Vec<String>,
    pub optional_deployment_targets: Vec<String>,
    pub minimum_environments_before_promotion: i64,
    pub is_optional_phase: bool,
}

/// A found lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleItem {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub release_retention_policy: Vec<RetentionModel>,
    pub tentacle_retention_policy: Vec<RetentionModel>,
    pub phase: Vec<PhaseItem>,
}

fn retention_type() -> AttrType {
    AttrType::list_of(object_type(&[
        ("strategy", AttrType::String),
        ("quantity_to_keep", AttrType::Int64),
        ("unit", AttrType::String),
        ("should_keep_forever", AttrType::Bool),
    ]))
}

fn phase_item(phase: &Phase) -> PhaseItem {
    PhaseItem {
        id: phase.id.clone(),
        name: phase.name.clone(),
        automatic_deployment_targets: phase.automatic_deployment_targets.clone(),
        optional_deployment_targets: phase.optional_deployment_targets.clone(),
        minimum_environments_before_promotion: i64::from(phase.minimum_environments_before_promotion),
        is_optional_phase: phase.is_optional_phase,
    }
}

pub struct Lifecycles;

impl SearchModel for Lifecycles {
    type Api = Lifecycle;
    type Item = LifecycleItem;

    const TYPE_NAME: &'static str = "octopusdeploy_lifecycles";
    const RESULTS: &'static str = "lifecycles";
    const KIND: &'static str = "lifecycles";

    fn item_type() -> AttrType {
        object_type(&[
            ("id", AttrType::String),
            ("name", AttrType::String),
            ("description", AttrType::String),
            ("space_id", AttrType::String),
            ("release_retention_policy", retention_type()),
            ("tentacle_retention_policy", retention_type()),
            (
                "phase",
                AttrType::list_of(object_type(&[
                    ("id", AttrType::String),
                    ("name", AttrType::String),
                    ("automatic_deployment_targets", AttrType::list_of(AttrType::String)),
                    ("optional_deployment_targets", AttrType::list_of(AttrType::String)),
                    ("minimum_environments_before_promotion", AttrType::Int64),
                    ("is_optional_phase", AttrType::Bool),
                ])),
            ),
        ])
    }

    fn item(api: &Lifecycle) -> LifecycleItem {
        LifecycleItem {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            release_retention_policy: flatten_retention_block(api.release_retention_policy.as_ref()),
            tentacle_retention_policy: flatten_retention_block(api.tentacle_retention_policy.as_ref()),
            phase: api.phases.iter().map(phase_item).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopusdeploy_client::models::RetentionPeriod;
    use octopusdeploy_framework::Value;

    #[test]
    fn test_item_conforms_to_type() {
        let lifecycle = Lifecycle {
            id: Some("Lifecycles-1".to_string()),
            name: "Default".to_string(),
            release_retention_policy: Some(RetentionPeriod::forever()),
            phases: vec![Phase {
                name: "Dev".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let value = Value::encode(&Lifecycles::item(&lifecycle)).unwrap();
        assert!(Lifecycles::item_type().conforms(&value));
        assert_eq!(value.get("phase").as_elements().map(<[Value]>::len), Some(1));
    }
}
