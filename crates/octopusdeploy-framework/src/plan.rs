//! Planning resource changes
//!
//! [`plan_resource_change`] merges configuration with prior state the way
//! Terraform does: configured values win, defaults fill null optional
//! attributes, and computed attributes become unknown whenever the
//! resource is going to change. Plan modifiers then get the last word.

use std::collections::BTreeMap;

use crate::path::AttributePath;
use crate::schema::{NestingMode, Schema};
use crate::value::Value;

/// What applying a plan will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Create,
    Update,
    /// Delete then create
    Replace,
    NoOp,
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanAction::Create => write!(f, "create"),
            PlanAction::Update => write!(f, "update in-place"),
            PlanAction::Replace => write!(f, "replace"),
            PlanAction::NoOp => write!(f, "no-op"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub action: PlanAction,
    pub planned_state: Value,
    /// Attributes whose change forces replacement
    pub requires_replace: Vec<AttributePath>,
}

pub struct PlanModifierRequest<'a> {
    pub path: &'a AttributePath,
    pub config: &'a Value,
    /// Prior value; `None` when the resource is being created
    pub state: Option<&'a Value>,
}

pub struct PlanModifierResponse {
    pub plan: Value,
    pub requires_replace: bool,
}

pub trait PlanModifier: Send + Sync {
    fn description(&self) -> String;

    fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse);
}

/// Keep the prior value of a computed attribute instead of planning unknown
#[derive(Debug, Clone, Copy, Default)]
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "Once set, the value of this attribute in state will not change.".to_string()
    }

    fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        if !response.plan.is_unknown() || !request.config.is_null() {
            return;
        }
        if let Some(state) = request.state.filter(|s| !s.is_null()) {
            response.plan = state.clone();
        }
    }
}

/// Changing the attribute destroys and recreates the resource
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "If the value of this attribute changes, Terraform will destroy and recreate the resource."
            .to_string()
    }

    fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        let Some(state) = request.state else {
            return;
        };
        if response.plan.is_unknown() {
            return;
        }
        if &response.plan != state {
            response.requires_replace = true;
        }
    }
}

/// Plan the change from `prior_state` (null when creating) to `config`
pub fn plan_resource_change(schema: &Schema, prior_state: &Value, config: &Value) -> PlannedChange {
    let config = schema.normalize(config);

    if prior_state.is_null() {
        let mut replace = Vec::new();
        let planned = plan_object(schema, None, &config, &AttributePath::root(), &mut replace);
        return PlannedChange {
            action: PlanAction::Create,
            planned_state: planned,
            requires_replace: Vec::new(),
        };
    }

    let prior = schema.normalize(prior_state);
    if merge_with_prior(schema, &prior, &config) == prior {
        return PlannedChange {
            action: PlanAction::NoOp,
            planned_state: prior,
            requires_replace: Vec::new(),
        };
    }

    let mut requires_replace = Vec::new();
    let planned = plan_object(
        schema,
        Some(&prior),
        &config,
        &AttributePath::root(),
        &mut requires_replace,
    );
    if requires_replace.is_empty() {
        return PlannedChange {
            action: PlanAction::Update,
            planned_state: planned,
            requires_replace,
        };
    }

    let mut ignored = Vec::new();
    let planned = plan_object(schema, None, &config, &AttributePath::root(), &mut ignored);
    PlannedChange {
        action: PlanAction::Replace,
        planned_state: planned,
        requires_replace,
    }
}

/// The plan as it would be if nothing computed changed
fn merge_with_prior(schema: &Schema, prior: &Value, config: &Value) -> Value {
    let mut out = BTreeMap::new();
    for (name, attr) in &schema.attributes {
        let configured = config.get(name);
        let value = if !configured.is_null() {
            configured.clone()
        } else if let Some(default) = &attr.default {
            default.clone()
        } else if attr.computed {
            prior.get(name).clone()
        } else {
            Value::Null
        };
        out.insert(name.clone(), value);
    }
    for (name, block) in &schema.blocks {
        let prior_elements = prior.get(name).as_elements().unwrap_or(&[]);
        let elements: Vec<Value> = config
            .get(name)
            .as_elements()
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let prior_element = prior_elements.get(i).unwrap_or(&Value::Null);
                merge_with_prior(&block.schema, prior_element, element)
            })
            .collect();
        out.insert(name.clone(), collect(block.nesting, elements));
    }
    Value::Object(out)
}

fn plan_object(
    schema: &Schema,
    prior: Option<&Value>,
    config: &Value,
    path: &AttributePath,
    requires_replace: &mut Vec<AttributePath>,
) -> Value {
    let mut out = BTreeMap::new();
    for (name, attr) in &schema.attributes {
        let attr_path = path.clone().attr(name);
        let configured = config.get(name);
        let state = prior.map(|p| p.get(name));

        let planned = if !configured.is_null() {
            configured.clone()
        } else if let Some(default) = &attr.default {
            default.clone()
        } else if attr.computed {
            Value::Unknown
        } else {
            Value::Null
        };

        let mut response = PlanModifierResponse {
            plan: planned,
            requires_replace: false,
        };
        let request = PlanModifierRequest {
            path: &attr_path,
            config: configured,
            state,
        };
        for modifier in &attr.plan_modifiers {
            modifier.modify(&request, &mut response);
        }
        if response.requires_replace {
            requires_replace.push(attr_path);
        }
        out.insert(name.clone(), response.plan);
    }

    for (name, block) in &schema.blocks {
        let block_path = path.clone().attr(name);
        let prior_elements = prior.and_then(|p| p.get(name).as_elements());
        let elements: Vec<Value> = config
            .get(name)
            .as_elements()
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let prior_element = prior_elements.and_then(|p| p.get(i));
                plan_object(
                    &block.schema,
                    prior_element,
                    element,
                    &block_path.clone().index(i),
                    requires_replace,
                )
            })
            .collect();
        out.insert(name.clone(), collect(block.nesting, elements));
    }
    Value::Object(out)
}

fn collect(nesting: NestingMode, elements: Vec<Value>) -> Value {
    match nesting {
        NestingMode::List => Value::List(elements),
        NestingMode::Set => Value::Set(elements),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrType, Attribute, Block};

    fn schema() -> Schema {
        Schema::new("test")
            .attribute(
                "id",
                Attribute::computed(AttrType::String).plan_modifier(UseStateForUnknown),
            )
            .attribute("name", Attribute::required(AttrType::String))
            .attribute("slug", Attribute::optional_computed(AttrType::String))
            .attribute(
                "sort_order",
                Attribute::optional(AttrType::Int64).default_value(0),
            )
            .attribute(
                "space_id",
                Attribute::optional_computed(AttrType::String)
                    .plan_modifier(UseStateForUnknown)
                    .plan_modifier(RequiresReplace),
            )
            .block(
                "phase",
                Block::list(
                    Schema::default()
                        .attribute("name", Attribute::required(AttrType::String))
                        .attribute("id", Attribute::computed(AttrType::String)),
                ),
            )
    }

    fn state() -> Value {
        Value::object([
            ("id", "Environments-1".into()),
            ("name", "Dev".into()),
            ("slug", "dev".into()),
            ("sort_order", 0.into()),
            ("space_id", "Spaces-1".into()),
            (
                "phase",
                Value::List(vec![Value::object([
                    ("name", "One".into()),
                    ("id", "Phases-1".into()),
                ])]),
            ),
        ])
    }

    fn config(name: &str) -> Value {
        Value::object([
            ("name", name.into()),
            (
                "phase",
                Value::List(vec![Value::object([("name", "One".into())])]),
            ),
        ])
    }

    #[test]
    fn test_create_plans_unknown_computed() {
        let change = plan_resource_change(&schema(), &Value::Null, &config("Dev"));
        assert_eq!(change.action, PlanAction::Create);
        let plan = &change.planned_state;
        assert!(plan.get("id").is_unknown());
        assert!(plan.get("slug").is_unknown());
        assert!(plan.get("space_id").is_unknown());
        assert_eq!(plan.get("sort_order").as_i64(), Some(0));
        assert_eq!(plan.get("name").as_str(), Some("Dev"));
    }

    #[test]
    fn test_unchanged_config_is_noop() {
        let change = plan_resource_change(&schema(), &state(), &config("Dev"));
        assert_eq!(change.action, PlanAction::NoOp);
        assert_eq!(change.planned_state, state());
    }

    #[test]
    fn test_update_keeps_state_for_unknown() {
        let change = plan_resource_change(&schema(), &state(), &config("Development"));
        assert_eq!(change.action, PlanAction::Update);
        let plan = &change.planned_state;
        assert_eq!(plan.get("id").as_str(), Some("Environments-1"));
        assert_eq!(plan.get("space_id").as_str(), Some("Spaces-1"));
        assert!(plan.get("slug").is_unknown());
        let phase_id = plan
            .get_path(&AttributePath::new("phase").index(0).attr("id"))
            .unwrap();
        assert!(phase_id.is_unknown());
    }

    #[test]
    fn test_changed_space_requires_replace() {
        let config = config("Dev").with("space_id", "Spaces-2".into());
        let change = plan_resource_change(&schema(), &state(), &config);
        assert_eq!(change.action, PlanAction::Replace);
        assert_eq!(change.requires_replace, vec![AttributePath::new("space_id")]);
        assert!(change.planned_state.get("id").is_unknown());
        assert_eq!(change.planned_state.get("space_id").as_str(), Some("Spaces-2"));
    }
}
