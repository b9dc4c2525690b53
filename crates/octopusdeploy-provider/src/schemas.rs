//! Attributes shared by many resources

use octopusdeploy_framework::validators::{between, length_at_least, one_of};
use octopusdeploy_framework::{AttrType, Attribute, RequiresReplace, UseStateForUnknown, Value};

use crate::util;

pub fn id() -> Attribute {
    Attribute::computed(AttrType::String)
        .description("The unique ID for this resource.")
        .plan_modifier(UseStateForUnknown)
}

/// Space of a space-scoped resource; defaults to the provider's space
pub fn space_id(kind: &str) -> Attribute {
    Attribute::optional_computed(AttrType::String)
        .description(format!("The space ID associated with this {}.", kind))
        .plan_modifier(UseStateForUnknown)
        .plan_modifier(RequiresReplace)
}

pub fn name(kind: &str) -> Attribute {
    Attribute::required(AttrType::String)
        .description(format!("The name of this {}.", kind))
        .validator(length_at_least(1))
}

pub fn description(kind: &str) -> Attribute {
    Attribute::optional(AttrType::String)
        .description(format!("The description of this {}.", kind))
        .default_value("")
}

/// Server-generated slug the user may override
pub fn slug(kind: &str) -> Attribute {
    Attribute::optional_computed(AttrType::String)
        .description(format!("The unique slug of this {}.", kind))
        .plan_modifier(UseStateForUnknown)
}

pub fn flag(description: &str, default: bool) -> Attribute {
    Attribute::optional(AttrType::Bool)
        .description(description)
        .default_value(default)
}

pub fn integer(description: &str, default: i64) -> Attribute {
    Attribute::optional(AttrType::Int64)
        .description(description)
        .default_value(default)
        .validator(between(0, util::MAX_API_INT))
}

pub fn string_list(description: &str) -> Attribute {
    Attribute::optional(AttrType::list_of(AttrType::String))
        .description(description)
        .default_value(Value::List(Vec::new()))
}

pub fn string_set(description: &str) -> Attribute {
    Attribute::optional(AttrType::set_of(AttrType::String))
        .description(description)
        .default_value(Value::Set(Vec::new()))
}

pub fn enumeration(description: &str, values: &[&str], default: &str) -> Attribute {
    Attribute::optional(AttrType::String)
        .description(format!("{} Valid values are {}.", description, values.join(", ")))
        .validator(one_of(values))
        .default_value(default)
}

/// Write-only secret; the API never returns it
pub fn secret(description: &str) -> Attribute {
    Attribute::optional(AttrType::String)
        .description(description)
        .sensitive()
}

pub fn required_secret(description: &str) -> Attribute {
    Attribute::required(AttrType::String)
        .description(description)
        .sensitive()
}

/// Tenanted deployment participation of accounts and projects
pub fn tenanted_deployment_participation() -> Attribute {
    enumeration(
        "The tenanted deployment mode of the resource.",
        octopusdeploy_client::models::TenantedDeploymentMode::VALUES,
        "Untenanted",
    )
}
