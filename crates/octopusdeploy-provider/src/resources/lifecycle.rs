//! `octopusdeploy_lifecycle`

use octopusdeploy_client::models::{Lifecycle, Phase};
use octopusdeploy_framework::{AttrType, Attribute, Block, Schema, UseStateForUnknown};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::retention::{
    RetentionModel, expand_retention_block, flatten_retention_block, retention_block,
};
use crate::{schemas, util};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseModel {
    pub id: Option<String>,
    pub name: String,
    pub automatic_deployment_targets: Vec<String>,
    pub optional_deployment_targets: Vec<String>,
    pub minimum_environments_before_promotion: i64,
    pub is_optional_phase: bool,
    pub is_priority_phase: bool,
    pub release_retention_policy: Vec<RetentionModel>,
    pub tentacle_retention_policy: Vec<RetentionModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub release_retention_policy: Vec<RetentionModel>,
    pub tentacle_retention_policy: Vec<RetentionModel>,
    pub phase: Vec<PhaseModel>,
}

const RELEASE_RETENTION: &str = "Defines the retention policy for releases.";
const TENTACLE_RETENTION: &str = "Defines the retention policy for deployed files on tentacles.";

fn phase_block() -> Block {
    Block::list(
        Schema::new("A phase of the lifecycle.")
            .attribute(
                "id",
                Attribute::computed(AttrType::String)
                    .description("The ID of this phase.")
                    .plan_modifier(UseStateForUnknown),
            )
            .attribute("name", schemas::name("phase"))
            .attribute(
                "automatic_deployment_targets",
                schemas::string_list("Environment IDs deployed to automatically when this phase is reached."),
            )
            .attribute(
                "optional_deployment_targets",
                schemas::string_list("Environment IDs that may be deployed to in this phase."),
            )
            .attribute(
                "minimum_environments_before_promotion",
                schemas::integer(
                    "Environments that must be deployed to before promotion; 0 means all.",
                    0,
                ),
            )
            .attribute(
                "is_optional_phase",
                schemas::flag("Whether this phase may be skipped.", false),
            )
            .attribute(
                "is_priority_phase",
                schemas::flag("Whether deployments in this phase are prioritised.", false),
            )
            .block("release_retention_policy", retention_block(RELEASE_RETENTION))
            .block("tentacle_retention_policy", retention_block(TENTACLE_RETENTION)),
    )
}

fn expand_phase(phase: &PhaseModel) -> Phase {
    Phase {
        id: phase.id.clone(),
        name: phase.name.clone(),
        automatic_deployment_targets: phase.automatic_deployment_targets.clone(),
        optional_deployment_targets: phase.optional_deployment_targets.clone(),
        minimum_environments_before_promotion: util::api_int(phase.minimum_environments_before_promotion),
        is_optional_phase: phase.is_optional_phase,
        is_priority_phase: phase.is_priority_phase,
        release_retention_policy: expand_retention_block(&phase.release_retention_policy),
        tentacle_retention_policy: expand_retention_block(&phase.tentacle_retention_policy),
    }
}

fn flatten_phase(phase: &Phase) -> PhaseModel {
    PhaseModel {
        id: phase.id.clone(),
        name: phase.name.clone(),
        automatic_deployment_targets: phase.automatic_deployment_targets.clone(),
        optional_deployment_targets: phase.optional_deployment_targets.clone(),
        minimum_environments_before_promotion: i64::from(phase.minimum_environments_before_promotion),
        is_optional_phase: phase.is_optional_phase,
        is_priority_phase: phase.is_priority_phase,
        release_retention_policy: flatten_retention_block(phase.release_retention_policy.as_ref()),
        tentacle_retention_policy: flatten_retention_block(phase.tentacle_retention_policy.as_ref()),
    }
}

/// Drop a retention block the server filled in but the prior model did
/// not declare
fn keep_declared(block: &mut Vec<RetentionModel>, prior: &[RetentionModel]) {
    if prior.is_empty() {
        block.clear();
    }
}

impl ResourceModel for LifecycleModel {
    type Api = Lifecycle;

    const TYPE_NAME: &'static str = "octopusdeploy_lifecycle";
    const KIND: &'static str = "lifecycle";

    fn schema() -> Schema {
        Schema::new("This resource manages lifecycles in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("lifecycle"))
            .attribute("description", schemas::description("lifecycle"))
            .attribute("space_id", schemas::space_id("lifecycle"))
            .block("release_retention_policy", retention_block(RELEASE_RETENTION))
            .block("tentacle_retention_policy", retention_block(TENTACLE_RETENTION))
            .block("phase", phase_block())
    }

    fn expand(&self) -> Lifecycle {
        Lifecycle {
            id: self.id.clone(),
            name: self.name.clone(),
            description: util::non_empty(&self.description),
            space_id: self.space_id.clone(),
            release_retention_policy: expand_retention_block(&self.release_retention_policy),
            tentacle_retention_policy: expand_retention_block(&self.tentacle_retention_policy),
            phases: self.phase.iter().map(expand_phase).collect(),
        }
    }

    fn flatten(api: &Lifecycle) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            release_retention_policy: flatten_retention_block(api.release_retention_policy.as_ref()),
            tentacle_retention_policy: flatten_retention_block(api.tentacle_retention_policy.as_ref()),
            phase: api.phases.iter().map(flatten_phase).collect(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        // Imports start from an id only and take everything the server has
        if prior.name.is_empty() {
            return;
        }
        keep_declared(&mut self.release_retention_policy, &prior.release_retention_policy);
        keep_declared(&mut self.tentacle_retention_policy, &prior.tentacle_retention_policy);
        for (phase, prior_phase) in self.phase.iter_mut().zip(&prior.phase) {
            keep_declared(&mut phase.release_retention_policy, &prior_phase.release_retention_policy);
            keep_declared(&mut phase.tentacle_retention_policy, &prior_phase.tentacle_retention_policy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopusdeploy_client::models::{RetentionPeriod, RetentionStrategy, RetentionUnit};
    use octopusdeploy_framework::{AttributePath, Value};

    fn lifecycle() -> Lifecycle {
        Lifecycle {
            id: Some("Lifecycles-1".to_string()),
            name: "Default".to_string(),
            description: Some("Standard promotion".to_string()),
            space_id: Some("Spaces-1".to_string()),
            release_retention_policy: Some(RetentionPeriod {
                strategy: Some(RetentionStrategy::Count),
                ..RetentionPeriod::count(30, RetentionUnit::Days)
            }),
            tentacle_retention_policy: Some(RetentionPeriod::forever()),
            phases: vec![
                Phase {
                    id: Some("Phases-1".to_string()),
                    name: "Dev".to_string(),
                    automatic_deployment_targets: vec!["Environments-1".to_string()],
                    minimum_environments_before_promotion: 1,
                    ..Default::default()
                },
                Phase {
                    id: Some("Phases-2".to_string()),
                    name: "Prod".to_string(),
                    optional_deployment_targets: vec!["Environments-2".to_string()],
                    is_priority_phase: true,
                    release_retention_policy: Some(RetentionPeriod::count(3, RetentionUnit::Items)),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_round_trip() {
        let populated = lifecycle();
        assert_eq!(LifecycleModel::flatten(&populated).expand(), populated);

        let empty = Lifecycle {
            name: "Empty".to_string(),
            ..Default::default()
        };
        assert_eq!(LifecycleModel::flatten(&empty).expand(), empty);
    }

    #[test]
    fn test_preserve_drops_undeclared_blocks() {
        let mut applied = LifecycleModel::flatten(&lifecycle());
        let declared = LifecycleModel {
            name: "Default".to_string(),
            tentacle_retention_policy: applied.tentacle_retention_policy.clone(),
            phase: vec![
                PhaseModel {
                    name: "Dev".to_string(),
                    ..Default::default()
                },
                applied.phase[1].clone(),
            ],
            ..Default::default()
        };
        applied.preserve(&declared);
        assert!(applied.release_retention_policy.is_empty());
        assert_eq!(applied.tentacle_retention_policy.len(), 1);
        assert_eq!(applied.phase[1].release_retention_policy.len(), 1);

        let mut imported = LifecycleModel::flatten(&lifecycle());
        imported.preserve(&LifecycleModel {
            id: Some("Lifecycles-1".to_string()),
            ..Default::default()
        });
        assert_eq!(imported.release_retention_policy.len(), 1);
    }

    #[test]
    fn test_nested_retention_validation() {
        let config = Value::object([
            ("name", Value::from("Default")),
            (
                "phase",
                Value::List(vec![Value::object([
                    ("name", Value::from("Dev")),
                    (
                        "release_retention_policy",
                        Value::List(vec![Value::object([
                            ("strategy", Value::from("Count")),
                            ("quantity_to_keep", Value::from(5)),
                        ])]),
                    ),
                ])]),
            ),
        ]);
        let diags = LifecycleModel::schema().validate(&config);
        assert_eq!(diags.error_count(), 1);
        let path = AttributePath::new("phase")
            .index(0)
            .attr("release_retention_policy")
            .index(0)
            .attr("unit");
        assert_eq!(diags.at(&path).len(), 1);
    }

    #[test]
    fn test_phase_validation_with_default_strategy() {
        let phase = |retention: Value, minimum: i64| {
            Value::object([
                ("name", Value::from("Default")),
                (
                    "phase",
                    Value::List(vec![Value::object([
                        ("name", Value::from("Dev")),
                        ("minimum_environments_before_promotion", Value::from(minimum)),
                        ("release_retention_policy", Value::List(vec![retention])),
                    ])]),
                ),
            ])
        };
        let retention_path = |name: &str| {
            AttributePath::new("phase")
                .index(0)
                .attr("release_retention_policy")
                .index(0)
                .attr(name)
        };

        let valid = phase(Value::object([("strategy", Value::from("Default"))]), 1);
        assert!(LifecycleModel::schema().validate(&valid).is_empty());

        let with_fields = phase(
            Value::object([
                ("strategy", Value::from("Default")),
                ("quantity_to_keep", Value::from(5)),
                ("unit", Value::from("Days")),
            ]),
            1,
        );
        let diags = LifecycleModel::schema().validate(&with_fields);
        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.at(&retention_path("quantity_to_keep")).len(), 1);
        assert_eq!(diags.at(&retention_path("unit")).len(), 1);

        let too_many = phase(Value::object([("strategy", Value::from("Default"))]), 4_294_967_296);
        let diags = LifecycleModel::schema().validate(&too_many);
        let minimum = AttributePath::new("phase")
            .index(0)
            .attr("minimum_environments_before_promotion");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.at(&minimum).len(), 1);
    }
}
