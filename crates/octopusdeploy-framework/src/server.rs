//! Driving a provider through the resource lifecycle
//!
//! [`ProviderServer`] indexes a provider's resources and data sources by
//! type name and runs each lifecycle step the way Terraform core would:
//! validate before planning, normalize every state the provider returns,
//! and reject results that are incomplete or contradict the plan.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Value as JsonValue, json};

use crate::diagnostics::Diagnostics;
use crate::error::{FrameworkError, Result};
use crate::path::AttributePath;
use crate::plan::{PlanAction, PlannedChange, plan_resource_change};
use crate::resource::{DataSource, Provider, Resource};
use crate::schema::Schema;
use crate::value::Value;

/// Result of one lifecycle step
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub value: Option<T>,
    pub diagnostics: Diagnostics,
}

impl<T> Response<T> {
    fn new(value: Option<T>, diagnostics: Diagnostics) -> Self {
        let value = if diagnostics.has_errors() { None } else { value };
        Self { value, diagnostics }
    }

    /// Keep `value` even though the step reported errors
    fn partial(value: T, diagnostics: Diagnostics) -> Self {
        Self {
            value: Some(value),
            diagnostics,
        }
    }

    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            value: None,
            diagnostics,
        }
    }
}

pub struct ProviderServer {
    provider: Arc<dyn Provider>,
    resources: IndexMap<String, Arc<dyn Resource>>,
    data_sources: IndexMap<String, Arc<dyn DataSource>>,
}

impl ProviderServer {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        let resources = provider
            .resources()
            .into_iter()
            .map(|r| (r.type_name().to_string(), r))
            .collect();
        let data_sources = provider
            .data_sources()
            .into_iter()
            .map(|d| (d.type_name().to_string(), d))
            .collect();
        Self {
            provider,
            resources,
            data_sources,
        }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    pub fn resource(&self, type_name: &str) -> Result<&Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .ok_or_else(|| FrameworkError::UnknownResourceType {
                name: type_name.to_string(),
            })
    }

    pub fn data_source(&self, type_name: &str) -> Result<&Arc<dyn DataSource>> {
        self.data_sources
            .get(type_name)
            .ok_or_else(|| FrameworkError::UnknownDataSource {
                name: type_name.to_string(),
            })
    }

    /// Every schema, in `terraform providers schema -json` layout
    pub fn schemas_json(&self) -> JsonValue {
        let resources: serde_json::Map<String, JsonValue> = self
            .resources
            .iter()
            .map(|(name, r)| (name.clone(), r.schema().to_json()))
            .collect();
        let data_sources: serde_json::Map<String, JsonValue> = self
            .data_sources
            .iter()
            .map(|(name, d)| (name.clone(), d.schema().to_json()))
            .collect();
        json!({
            "provider": self.provider.schema().to_json(),
            "resource_schemas": resources,
            "data_source_schemas": data_sources,
        })
    }

    pub async fn configure(&self, config: &Value) -> Response<()> {
        let schema = self.provider.schema();
        let mut diags = schema.validate(config);
        if diags.has_errors() {
            return Response::failed(diags);
        }
        let config = schema.normalize(config);
        let configured = self.provider.configure(&mut diags, &config).await;
        Response::new(configured, diags)
    }

    pub async fn validate_resource_config(&self, type_name: &str, config: &Value) -> Result<Diagnostics> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let mut diags = schema.validate(config);
        if let Some(message) = &schema.deprecation_message {
            diags.add_warning(format!("Deprecated resource {}", type_name), message.clone());
        }
        if !diags.has_errors() {
            resource.validate(&mut diags, &schema.normalize(config)).await;
        }
        Ok(diags)
    }

    pub async fn plan(&self, type_name: &str, prior_state: &Value, config: &Value) -> Result<Response<PlannedChange>> {
        let schema = self.resource(type_name)?.schema();
        let diags = self.validate_resource_config(type_name, config).await?;
        if diags.has_errors() {
            return Ok(Response::failed(diags));
        }
        let change = plan_resource_change(&schema, prior_state, config);
        tracing::debug!(resource = type_name, action = %change.action, "planned change");
        Ok(Response::new(Some(change), diags))
    }

    /// Carry out a planned change; returns the new state
    ///
    /// A resource that fails after creating or changing its remote object
    /// may still return that object's state. It is passed back with the
    /// errors so the object stays tracked.
    pub async fn apply(&self, type_name: &str, prior_state: &Value, change: &PlannedChange) -> Result<Response<Value>> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let mut diags = Diagnostics::new();
        let planned = &change.planned_state;

        let new_state = match change.action {
            PlanAction::NoOp => Some(planned.clone()),
            PlanAction::Create => resource.create(&mut diags, planned).await,
            PlanAction::Update => resource.update(&mut diags, prior_state, planned).await,
            PlanAction::Replace => {
                if resource.delete(&mut diags, prior_state).await.is_none() || diags.has_errors() {
                    return Ok(Response::failed(diags));
                }
                resource.create(&mut diags, planned).await
            }
        };

        let Some(new_state) = new_state else {
            return Ok(Response::failed(diags));
        };
        let new_state = schema.normalize(&new_state);
        if diags.has_errors() {
            if new_state.is_fully_known() {
                tracing::warn!(resource = type_name, action = %change.action, "change applied partially");
                return Ok(Response::partial(new_state, diags));
            }
            return Ok(Response::failed(diags));
        }
        check_applied_state(&schema, planned, &new_state, &mut diags);
        tracing::info!(resource = type_name, action = %change.action, "applied change");
        Ok(Response::new(Some(new_state), diags))
    }

    /// Refresh state; the value is null when the object is gone
    pub async fn read(&self, type_name: &str, state: &Value) -> Result<Response<Value>> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let mut diags = Diagnostics::new();
        let refreshed = resource
            .read(&mut diags, &schema.normalize(state))
            .await
            .map(|v| if v.is_null() { v } else { schema.normalize(&v) });
        Ok(Response::new(refreshed, diags))
    }

    pub async fn destroy(&self, type_name: &str, state: &Value) -> Result<Diagnostics> {
        let resource = self.resource(type_name)?;
        let mut diags = Diagnostics::new();
        resource.delete(&mut diags, state).await;
        tracing::info!(resource = type_name, "destroyed");
        Ok(diags)
    }

    pub async fn import(&self, type_name: &str, id: &str) -> Result<Response<Value>> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let mut diags = Diagnostics::new();
        let imported = resource.import(&mut diags, id).await;
        let imported = match imported {
            Some(v) if v.is_null() => {
                diags.add_error(
                    "Cannot import non-existent remote object",
                    format!("No {} with id {:?} was found.", type_name, id),
                );
                None
            }
            other => other.map(|v| schema.normalize(&v)),
        };
        Ok(Response::new(imported, diags))
    }

    pub async fn read_data_source(&self, type_name: &str, config: &Value) -> Result<Response<Value>> {
        let data_source = self.data_source(type_name)?;
        let schema = data_source.schema();
        let mut diags = schema.validate(config);
        if diags.has_errors() {
            return Ok(Response::failed(diags));
        }
        let state = data_source.read(&mut diags, &schema.normalize(config)).await;
        Ok(Response::new(state.map(|s| schema.normalize(&s)), diags))
    }
}

fn check_applied_state(schema: &Schema, planned: &Value, applied: &Value, diags: &mut Diagnostics) {
    if !applied.is_fully_known() {
        diags.add_error(
            "Provider returned invalid result object after apply",
            "After the apply operation, the provider still indicated an unknown value. All values must be known after apply.",
        );
        return;
    }
    for name in schema.attributes.keys() {
        let planned_value = planned.get(name);
        if !planned_value.is_fully_known() {
            continue;
        }
        let applied_value = applied.get(name);
        if planned_value != applied_value {
            diags.add_attribute_error(
                AttributePath::new(name),
                "Provider produced inconsistent result after apply",
                format!(
                    "When applying changes, the provider produced an unexpected new value for {}.",
                    name
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::UseStateForUnknown;
    use crate::schema::{AttrType, Attribute};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-memory resource keyed by id
    #[derive(Default)]
    struct MemoryResource {
        objects: Mutex<BTreeMap<String, Value>>,
        wrong_name: bool,
        fail_after_create: bool,
    }

    #[async_trait]
    impl Resource for MemoryResource {
        fn type_name(&self) -> &str {
            "test_thing"
        }

        fn schema(&self) -> Schema {
            Schema::new("thing")
                .attribute(
                    "id",
                    Attribute::computed(AttrType::String).plan_modifier(UseStateForUnknown),
                )
                .attribute("name", Attribute::required(AttrType::String))
        }

        async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value> {
            let mut objects = self.objects.lock().unwrap();
            let id = format!("Things-{}", objects.len() + 1);
            let mut state = plan.clone().with("id", id.clone().into());
            if self.wrong_name {
                state.set("name", "renamed".into());
            }
            objects.insert(id, state.clone());
            if self.fail_after_create {
                diags.add_error("Error finishing thing", "follow-up call failed");
            }
            Some(state)
        }

        async fn read(&self, _diags: &mut Diagnostics, state: &Value) -> Option<Value> {
            let id = state.get("id").as_str()?;
            Some(self.objects.lock().unwrap().get(id).cloned().unwrap_or(Value::Null))
        }

        async fn update(&self, _diags: &mut Diagnostics, _prior: &Value, plan: &Value) -> Option<Value> {
            let id = plan.get("id").as_str()?.to_string();
            self.objects.lock().unwrap().insert(id, plan.clone());
            Some(plan.clone())
        }

        async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()> {
            let id = state.get("id").as_str()?;
            if self.objects.lock().unwrap().remove(id).is_none() {
                diags.add_error("Not found", id.to_string());
                return None;
            }
            Some(())
        }
    }

    struct TestProvider {
        resource: Arc<MemoryResource>,
    }

    #[async_trait]
    impl Provider for TestProvider {
        fn type_name(&self) -> &str {
            "test"
        }

        fn schema(&self) -> Schema {
            Schema::new("provider").attribute("token", Attribute::optional(AttrType::String).sensitive())
        }

        async fn configure(&self, _diags: &mut Diagnostics, _config: &Value) -> Option<()> {
            Some(())
        }

        fn resources(&self) -> Vec<Arc<dyn Resource>> {
            vec![self.resource.clone() as Arc<dyn Resource>]
        }

        fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
            Vec::new()
        }
    }

    fn server(wrong_name: bool) -> ProviderServer {
        server_with(MemoryResource {
            wrong_name,
            ..Default::default()
        })
    }

    fn server_with(resource: MemoryResource) -> ProviderServer {
        ProviderServer::new(Arc::new(TestProvider {
            resource: Arc::new(resource),
        }))
    }

    fn config(name: &str) -> Value {
        Value::object([("name", name.into())])
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let server = server(false);

        let plan = server.plan("test_thing", &Value::Null, &config("a")).await.unwrap();
        let change = plan.value.unwrap();
        assert_eq!(change.action, PlanAction::Create);

        let applied = server.apply("test_thing", &Value::Null, &change).await.unwrap();
        let state = applied.value.unwrap();
        assert_eq!(state.get("id").as_str(), Some("Things-1"));

        let refreshed = server.read("test_thing", &state).await.unwrap().value.unwrap();
        assert_eq!(refreshed, state);

        let noop = server.plan("test_thing", &state, &config("a")).await.unwrap();
        assert_eq!(noop.value.unwrap().action, PlanAction::NoOp);

        let update = server.plan("test_thing", &state, &config("b")).await.unwrap().value.unwrap();
        assert_eq!(update.action, PlanAction::Update);
        assert_eq!(update.planned_state.get("id").as_str(), Some("Things-1"));
        let updated = server.apply("test_thing", &state, &update).await.unwrap().value.unwrap();
        assert_eq!(updated.get("name").as_str(), Some("b"));

        let diags = server.destroy("test_thing", &updated).await.unwrap();
        assert!(diags.is_empty());
        let gone = server.read("test_thing", &updated).await.unwrap().value.unwrap();
        assert!(gone.is_null());
    }

    #[tokio::test]
    async fn test_invalid_config_is_not_planned() {
        let server = server(false);
        let plan = server
            .plan("test_thing", &Value::Null, &Value::object([("nme", "a".into())]))
            .await
            .unwrap();
        assert!(plan.value.is_none());
        assert_eq!(plan.diagnostics.error_count(), 2);
    }

    #[tokio::test]
    async fn test_inconsistent_result_is_rejected() {
        let server = server(true);
        let change = server
            .plan("test_thing", &Value::Null, &config("a"))
            .await
            .unwrap()
            .value
            .unwrap();
        let applied = server.apply("test_thing", &Value::Null, &change).await.unwrap();
        assert!(applied.value.is_none());
        assert_eq!(
            applied.diagnostics.iter().next().unwrap().summary,
            "Provider produced inconsistent result after apply"
        );
    }

    #[tokio::test]
    async fn test_partial_apply_keeps_created_state() {
        let server = server_with(MemoryResource {
            fail_after_create: true,
            ..Default::default()
        });
        let change = server
            .plan("test_thing", &Value::Null, &config("a"))
            .await
            .unwrap()
            .value
            .unwrap();
        let applied = server.apply("test_thing", &Value::Null, &change).await.unwrap();
        assert_eq!(applied.diagnostics.error_count(), 1);
        let state = applied.value.unwrap();
        assert_eq!(state.get("id").as_str(), Some("Things-1"));
        assert_eq!(state.get("name").as_str(), Some("a"));
    }

    #[tokio::test]
    async fn test_import_missing_object() {
        let server = server(false);
        let imported = server.import("test_thing", "Things-9").await.unwrap();
        assert!(imported.value.is_none());
        assert!(imported.diagnostics.has_errors());
    }

    #[test]
    fn test_unknown_type() {
        let server = server(false);
        assert!(matches!(
            server.resource("test_other"),
            Err(FrameworkError::UnknownResourceType { .. })
        ));
        let schemas = server.schemas_json();
        assert!(schemas["resource_schemas"]["test_thing"].is_object());
    }
}
