//! Terraform plugin building blocks
//!
//! Values, attribute paths, diagnostics, schemas with validators and plan
//! modifiers, a planner, and the [`Resource`], [`DataSource`] and
//! [`Provider`] traits the Octopus Deploy provider implements. The
//! [`ProviderServer`] drives a provider through validate, plan, apply,
//! read, import and destroy.

pub mod diagnostics;
pub mod error;
pub mod path;
pub mod plan;
pub mod resource;
pub mod schema;
pub mod server;
pub mod validators;
pub mod value;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{FrameworkError, Result};
pub use path::{AttributePath, PathStep};
pub use plan::{
    PlanAction, PlanModifier, PlanModifierRequest, PlanModifierResponse, PlannedChange,
    RequiresReplace, UseStateForUnknown, plan_resource_change,
};
pub use resource::{DataSource, Provider, Resource};
pub use schema::{AttrType, Attribute, Block, NestingMode, Schema};
pub use server::{ProviderServer, Response};
pub use validators::{ValidationRequest, Validator};
pub use value::Value;
