//! Resource, data source and provider traits
//!
//! Operations report problems through [`Diagnostics`] and return `None` when
//! they could not produce a result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::diagnostics::Diagnostics;
use crate::schema::Schema;
use crate::value::Value;

#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. `octopusdeploy_environment`
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Checks that need more than one attribute or outside state
    async fn validate(&self, _diags: &mut Diagnostics, _config: &Value) {}

    /// Create the resource and return its new state; when a step after
    /// the object was created fails, return its state with the errors
    async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value>;

    /// Refresh state from the server; `Some(Value::Null)` when the resource
    /// no longer exists
    async fn read(&self, diags: &mut Diagnostics, state: &Value) -> Option<Value>;

    async fn update(&self, diags: &mut Diagnostics, prior: &Value, plan: &Value) -> Option<Value>;

    async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()>;

    /// Import an existing object by id
    async fn import(&self, diags: &mut Diagnostics, id: &str) -> Option<Value> {
        let state = Value::object([("id", Value::from(id))]);
        self.read(diags, &state).await
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    async fn read(&self, diags: &mut Diagnostics, config: &Value) -> Option<Value>;
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix of every resource type name
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    async fn configure(&self, diags: &mut Diagnostics, config: &Value) -> Option<()>;

    fn resources(&self) -> Vec<Arc<dyn Resource>>;

    fn data_sources(&self) -> Vec<Arc<dyn DataSource>>;
}
