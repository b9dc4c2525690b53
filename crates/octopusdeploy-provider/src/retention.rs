//! Retention policies
//!
//! Two shapes exist. The strategy form picks `Default`, `Forever` or `Count`
//! and only takes `quantity_to_keep` and `unit` with `Count`. The legacy form
//! has no strategy and describes retention with `should_keep_forever` and a
//! quantity.

use octopusdeploy_client::models::{RetentionPeriod, RetentionStrategy, RetentionUnit};
use octopusdeploy_framework::validators::{between, conflicts_with, one_of};
use octopusdeploy_framework::{
    AttrType, Attribute, Block, Diagnostics, Schema, ValidationRequest, Validator,
};
use serde::{Deserialize, Serialize};

use crate::util::{self, MAX_API_INT};

pub const STRATEGY: &str = "strategy";
pub const QUANTITY_TO_KEEP: &str = "quantity_to_keep";
pub const UNIT: &str = "unit";
pub const SHOULD_KEEP_FOREVER: &str = "should_keep_forever";

/// A field whose presence is dictated by the sibling `strategy`:
/// required with `Count`, forbidden with any other strategy
#[derive(Debug, Clone, Copy)]
pub struct StrategyDependentValidator {
    attribute: &'static str,
}

pub fn quantity_to_keep_for_strategy() -> StrategyDependentValidator {
    StrategyDependentValidator {
        attribute: QUANTITY_TO_KEEP,
    }
}

pub fn unit_for_strategy() -> StrategyDependentValidator {
    StrategyDependentValidator { attribute: UNIT }
}

impl Validator for StrategyDependentValidator {
    fn description(&self) -> String {
        format!(
            "{} is required when {} is Count and must be unset otherwise",
            self.attribute, STRATEGY
        )
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        let strategy = request.sibling(STRATEGY);
        let Some(strategy) = strategy.as_str() else {
            return;
        };

        if strategy == RetentionStrategy::Count.as_str() {
            if request.value.is_null() {
                diags.add_attribute_error(
                    request.path.clone(),
                    "Missing retention attribute",
                    format!("{} is required when {} is Count", self.attribute, STRATEGY),
                );
            }
        } else if !request.value.is_null() && !request.value.is_unknown() {
            diags.add_attribute_error(
                request.path.clone(),
                "Unexpected retention attribute",
                format!(
                    "{} must not be set when {} is {}",
                    self.attribute, STRATEGY, strategy
                ),
            );
        }
    }
}

/// Range of `quantity_to_keep` in a retention block: at most the API's
/// 32-bit limit, and at least 1 with the `Count` strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionQuantityValidator;

impl Validator for RetentionQuantityValidator {
    fn description(&self) -> String {
        format!(
            "{} must be at most {}, and at least 1 when {} is Count",
            QUANTITY_TO_KEEP, MAX_API_INT, STRATEGY
        )
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        let Some(quantity) = request.value.as_i64() else {
            return;
        };
        let count = request.sibling(STRATEGY).as_str() == Some(RetentionStrategy::Count.as_str());
        if quantity > MAX_API_INT {
            diags.add_attribute_error(
                request.path.clone(),
                "Invalid retention policy",
                format!("{} must be at most {}, got: {}", QUANTITY_TO_KEEP, MAX_API_INT, quantity),
            );
        } else if count && quantity < 1 {
            diags.add_attribute_error(
                request.path.clone(),
                "Invalid retention policy",
                format!("{} must be at least 1 when {} is Count, got: {}", QUANTITY_TO_KEEP, STRATEGY, quantity),
            );
        }
    }
}

/// Legacy retention block rule: with `should_keep_forever` the quantity is
/// unset or 0, otherwise at least 1
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyRetentionValidator;

impl Validator for LegacyRetentionValidator {
    fn description(&self) -> String {
        "quantity_to_keep must be 0 when should_keep_forever is true, and at least 1 otherwise"
            .to_string()
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if !request.child(STRATEGY).is_null() {
            return;
        }
        let keep_forever = request.child(SHOULD_KEEP_FOREVER);
        let quantity = request.child(QUANTITY_TO_KEEP);
        if keep_forever.is_unknown() || quantity.is_unknown() {
            return;
        }

        let path = request.path.clone().attr(QUANTITY_TO_KEEP);
        if keep_forever.as_bool() == Some(true) {
            if quantity.as_i64().is_some_and(|q| q != 0) {
                diags.add_attribute_error(
                    path,
                    "Invalid retention policy",
                    "quantity_to_keep must be 0 or unset when should_keep_forever is true",
                );
            }
        } else if quantity.as_i64().is_none_or(|q| q < 1) {
            diags.add_attribute_error(
                path,
                "Invalid retention policy",
                "quantity_to_keep must be at least 1 when should_keep_forever is false",
            );
        }
    }
}

/// Retention block of a lifecycle or phase; accepts both forms
pub fn retention_block(description: &str) -> Block {
    Block::list(
        Schema::new(description)
            .attribute(
                STRATEGY,
                Attribute::optional_computed(AttrType::String)
                    .description("How retention is decided: Default, Forever or Count.")
                    .validator(one_of(RetentionStrategy::VALUES)),
            )
            .attribute(
                QUANTITY_TO_KEEP,
                Attribute::optional_computed(AttrType::Int64)
                    .description("The number of days or releases to keep.")
                    .validator(RetentionQuantityValidator)
                    .validator(quantity_to_keep_for_strategy()),
            )
            .attribute(
                UNIT,
                Attribute::optional_computed(AttrType::String)
                    .description("The unit of quantity_to_keep: Days or Items.")
                    .validator(one_of(RetentionUnit::VALUES))
                    .validator(unit_for_strategy()),
            )
            .attribute(
                SHOULD_KEEP_FOREVER,
                Attribute::optional_computed(AttrType::Bool)
                    .description("Keep everything. Cannot be combined with strategy.")
                    .validator(conflicts_with(&[STRATEGY])),
            )
            .validator(LegacyRetentionValidator),
    )
    .max_items(1)
}

/// Terraform form of a retention block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionModel {
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub quantity_to_keep: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub should_keep_forever: Option<bool>,
}

pub fn expand_retention(model: &RetentionModel) -> RetentionPeriod {
    let strategy = model.strategy.as_deref().and_then(RetentionStrategy::parse);
    let unit = model.unit.as_deref().and_then(RetentionUnit::parse);
    let quantity = util::api_int(model.quantity_to_keep.unwrap_or(0));

    match strategy {
        Some(RetentionStrategy::Forever) => RetentionPeriod {
            strategy,
            ..RetentionPeriod::forever()
        },
        Some(RetentionStrategy::Count) => RetentionPeriod {
            strategy,
            ..RetentionPeriod::count(quantity, unit.unwrap_or_default())
        },
        Some(RetentionStrategy::Default) => RetentionPeriod {
            strategy,
            quantity_to_keep: 0,
            should_keep_forever: false,
            unit: RetentionUnit::Days,
        },
        None => {
            let keep_forever = model.should_keep_forever.unwrap_or(false);
            RetentionPeriod {
                strategy: None,
                quantity_to_keep: if keep_forever { 0 } else { quantity },
                should_keep_forever: keep_forever,
                unit: unit.unwrap_or_default(),
            }
        }
    }
}

pub fn flatten_retention(period: &RetentionPeriod) -> RetentionModel {
    match period.strategy {
        Some(RetentionStrategy::Count) => RetentionModel {
            strategy: Some(RetentionStrategy::Count.as_str().to_string()),
            quantity_to_keep: Some(i64::from(period.quantity_to_keep)),
            unit: Some(period.unit.as_str().to_string()),
            should_keep_forever: None,
        },
        Some(strategy) => RetentionModel {
            strategy: Some(strategy.as_str().to_string()),
            ..Default::default()
        },
        None => RetentionModel {
            strategy: None,
            quantity_to_keep: Some(i64::from(period.quantity_to_keep)),
            unit: Some(period.unit.as_str().to_string()),
            should_keep_forever: Some(period.should_keep_forever),
        },
    }
}

/// Expand an optional (max one element) retention block
pub fn expand_retention_block(block: &[RetentionModel]) -> Option<RetentionPeriod> {
    block.first().map(expand_retention)
}

pub fn flatten_retention_block(period: Option<&RetentionPeriod>) -> Vec<RetentionModel> {
    period.map(flatten_retention).into_iter().collect()
}

/// Attributes shared by the space default retention policy resources
pub fn space_default_attributes(schema: Schema) -> Schema {
    schema
        .attribute(
            STRATEGY,
            Attribute::required(AttrType::String)
                .description("How retention is decided: Forever or Count.")
                .validator(one_of(&[
                    RetentionStrategy::Forever.as_str(),
                    RetentionStrategy::Count.as_str(),
                ])),
        )
        .attribute(
            QUANTITY_TO_KEEP,
            Attribute::optional(AttrType::Int64)
                .description("The number of days or items to keep. Required when strategy is Count.")
                .validator(between(1, MAX_API_INT))
                .validator(quantity_to_keep_for_strategy()),
        )
        .attribute(
            UNIT,
            Attribute::optional(AttrType::String)
                .description("The unit of quantity_to_keep: Days or Items. Required when strategy is Count.")
                .validator(one_of(RetentionUnit::VALUES))
                .validator(unit_for_strategy()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopusdeploy_framework::{AttributePath, Value};

    fn retention_value(model: &RetentionModel) -> Value {
        Value::object([
            (STRATEGY, Value::from(model.strategy.clone())),
            (QUANTITY_TO_KEEP, Value::from(model.quantity_to_keep)),
            (UNIT, Value::from(model.unit.clone())),
            (SHOULD_KEEP_FOREVER, Value::from(model.should_keep_forever)),
        ])
    }

    fn validate_space_default(strategy: &str, quantity: Option<i64>, unit: Option<&str>) -> Diagnostics {
        let schema = space_default_attributes(Schema::default());
        let config = Value::object([
            (STRATEGY, Value::from(strategy)),
            (QUANTITY_TO_KEEP, Value::from(quantity)),
            (UNIT, Value::from(unit)),
        ]);
        schema.validate(&config)
    }

    #[test]
    fn test_strategy_dependent_fields() {
        // (strategy, quantity, unit, error paths)
        let cases: &[(&str, Option<i64>, Option<&str>, &[&str])] = &[
            ("Count", Some(30), Some("Days"), &[]),
            ("Count", None, Some("Days"), &[QUANTITY_TO_KEEP]),
            ("Count", Some(30), None, &[UNIT]),
            ("Count", None, None, &[QUANTITY_TO_KEEP, UNIT]),
            ("Forever", None, None, &[]),
            ("Forever", Some(5), None, &[QUANTITY_TO_KEEP]),
            ("Forever", None, Some("Items"), &[UNIT]),
            ("Forever", Some(5), Some("Items"), &[QUANTITY_TO_KEEP, UNIT]),
        ];

        for (strategy, quantity, unit, expected) in cases {
            let diags = validate_space_default(strategy, *quantity, *unit);
            let mut paths: Vec<String> = diags
                .iter()
                .filter_map(|d| d.path.as_ref().map(|p| p.to_string()))
                .collect();
            paths.sort();
            assert_eq!(
                paths, *expected,
                "strategy={} quantity={:?} unit={:?}",
                strategy, quantity, unit
            );
        }
    }

    #[test]
    fn test_unknown_strategy_is_not_judged() {
        let schema = space_default_attributes(Schema::default());
        let config = Value::object([
            (STRATEGY, Value::Unknown),
            (QUANTITY_TO_KEEP, Value::from(3)),
        ]);
        assert!(schema.validate(&config).is_empty());
    }

    fn validate_block(element: Value) -> Diagnostics {
        let schema = Schema::default().block("release_retention_policy", retention_block("policy"));
        schema.validate(&Value::object([(
            "release_retention_policy",
            Value::List(vec![element]),
        )]))
    }

    #[test]
    fn test_legacy_rules() {
        let quantity_path = AttributePath::new("release_retention_policy")
            .index(0)
            .attr(QUANTITY_TO_KEEP);

        let cases: &[(Option<bool>, Option<i64>, bool)] = &[
            (Some(true), None, true),
            (Some(true), Some(0), true),
            (Some(true), Some(3), false),
            (Some(false), Some(1), true),
            (Some(false), Some(0), false),
            (Some(false), None, false),
            (None, Some(10), true),
        ];
        for (keep, quantity, valid) in cases {
            let diags = validate_block(Value::object([
                (SHOULD_KEEP_FOREVER, Value::from(*keep)),
                (QUANTITY_TO_KEEP, Value::from(*quantity)),
                (UNIT, Value::from("Days")),
            ]));
            assert_eq!(diags.is_empty(), *valid, "keep={:?} quantity={:?}", keep, quantity);
            if !valid {
                assert_eq!(diags.at(&quantity_path).len(), 1);
            }
        }
    }

    #[test]
    fn test_strategy_block_dependent_fields() {
        let field_path = |name: &str| AttributePath::new("release_retention_policy").index(0).attr(name);

        // (strategy, quantity, unit, attributes with errors)
        let cases: &[(&str, Option<i64>, Option<&str>, &[&str])] = &[
            ("Default", None, None, &[]),
            ("Default", Some(5), None, &[QUANTITY_TO_KEEP]),
            ("Default", None, Some("Days"), &[UNIT]),
            ("Default", Some(5), Some("Days"), &[QUANTITY_TO_KEEP, UNIT]),
            ("Forever", None, None, &[]),
            ("Forever", Some(5), Some("Items"), &[QUANTITY_TO_KEEP, UNIT]),
            ("Count", Some(3), Some("Items"), &[]),
            ("Count", None, Some("Items"), &[QUANTITY_TO_KEEP]),
            ("Count", Some(0), Some("Days"), &[QUANTITY_TO_KEEP]),
            ("Count", Some(-2), Some("Days"), &[QUANTITY_TO_KEEP]),
            ("Count", Some(4_294_967_301), Some("Days"), &[QUANTITY_TO_KEEP]),
        ];

        for (strategy, quantity, unit, expected) in cases {
            let diags = validate_block(Value::object([
                (STRATEGY, Value::from(*strategy)),
                (QUANTITY_TO_KEEP, Value::from(*quantity)),
                (UNIT, Value::from(*unit)),
            ]));
            let context = format!("strategy={} quantity={:?} unit={:?}", strategy, quantity, unit);
            assert_eq!(diags.error_count(), expected.len(), "{}", context);
            for name in *expected {
                assert_eq!(diags.at(&field_path(name)).len(), 1, "{} at {}", context, name);
            }
        }
    }

    #[test]
    fn test_legacy_quantity_beyond_api_range() {
        let diags = validate_block(Value::object([
            (SHOULD_KEEP_FOREVER, Value::from(false)),
            (QUANTITY_TO_KEEP, Value::from(3_000_000_000_i64)),
            (UNIT, Value::from("Days")),
        ]));
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.iter().next().unwrap().summary, "Invalid retention policy");
    }

    #[test]
    fn test_expand_saturates_out_of_range_quantity() {
        let model = RetentionModel {
            quantity_to_keep: Some(-3_000_000_000),
            should_keep_forever: Some(false),
            ..Default::default()
        };
        assert_eq!(expand_retention(&model).quantity_to_keep, i32::MIN);
    }

    #[test]
    fn test_strategy_block_rejects_keep_forever() {
        let diags = validate_block(Value::object([
            (STRATEGY, Value::from("Forever")),
            (SHOULD_KEEP_FOREVER, Value::from(true)),
        ]));
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.iter().next().unwrap().summary, "Invalid Attribute Combination");

        let diags = validate_block(Value::object([
            (STRATEGY, Value::from("Count")),
            (QUANTITY_TO_KEEP, Value::from(3)),
        ]));
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_round_trip() {
        let periods = [
            RetentionPeriod {
                strategy: Some(RetentionStrategy::Count),
                ..RetentionPeriod::count(30, RetentionUnit::Days)
            },
            RetentionPeriod {
                strategy: Some(RetentionStrategy::Forever),
                ..RetentionPeriod::forever()
            },
            RetentionPeriod {
                strategy: Some(RetentionStrategy::Default),
                quantity_to_keep: 0,
                should_keep_forever: false,
                unit: RetentionUnit::Days,
            },
            RetentionPeriod::forever(),
            RetentionPeriod::count(5, RetentionUnit::Items),
        ];
        for period in periods {
            assert_eq!(expand_retention(&flatten_retention(&period)), period);
        }
        assert!(flatten_retention_block(None).is_empty());
        assert_eq!(expand_retention_block(&[]), None);
    }

    #[test]
    fn test_model_decodes_from_block_value() {
        let model = RetentionModel {
            strategy: Some("Count".to_string()),
            quantity_to_keep: Some(3),
            unit: Some("Items".to_string()),
            should_keep_forever: None,
        };
        let decoded: RetentionModel = retention_value(&model).decode().unwrap();
        assert_eq!(decoded, model);
    }
}
