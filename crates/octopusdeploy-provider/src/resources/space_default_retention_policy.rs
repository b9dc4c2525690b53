//! `octopusdeploy_space_default_lifecycle_release_retention_policy` and
//! `octopusdeploy_space_default_lifecycle_tentacle_retention_policy`
//!
//! Every space has exactly one policy of each retention type. Creating the
//! resource adopts and rewrites it; deleting it resets it to keep forever.

use async_trait::async_trait;
use octopusdeploy_client::OctopusClient;
use octopusdeploy_client::models::{
    ApiResource, RetentionStrategy, RetentionType, RetentionUnit, SpaceDefaultRetentionPolicy,
};
use octopusdeploy_framework::{Diagnostics, Resource, Schema, Value};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderData;
use crate::retention::{QUANTITY_TO_KEEP, space_default_attributes};
use crate::{schemas, util};

const KIND: &str = "space default retention policy";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceDefaultRetentionPolicyModel {
    pub id: Option<String>,
    pub space_id: Option<String>,
    pub strategy: String,
    pub quantity_to_keep: Option<i64>,
    pub unit: Option<String>,
}

impl SpaceDefaultRetentionPolicyModel {
    /// Write the configured rule onto the server's policy
    pub fn apply_to(&self, diags: &mut Diagnostics, policy: &mut SpaceDefaultRetentionPolicy) -> Option<()> {
        let strategy = RetentionStrategy::parse(&self.strategy).unwrap_or(RetentionStrategy::Forever);
        policy.strategy = strategy;
        if strategy == RetentionStrategy::Count {
            policy.quantity_to_keep = match self.quantity_to_keep {
                Some(q) => Some(util::checked_api_int(diags, QUANTITY_TO_KEEP, q)?),
                None => None,
            };
            policy.unit = self.unit.as_deref().and_then(RetentionUnit::parse);
        } else {
            policy.quantity_to_keep = None;
            policy.unit = None;
        }
        Some(())
    }

    pub fn flatten(policy: &SpaceDefaultRetentionPolicy, space_id: Option<&str>) -> Self {
        let count = policy.strategy == RetentionStrategy::Count;
        Self {
            id: policy.id.clone(),
            space_id: policy.space_id.clone().or_else(|| space_id.map(str::to_string)),
            strategy: policy.strategy.as_str().to_string(),
            quantity_to_keep: policy
                .quantity_to_keep
                .filter(|_| count)
                .map(i64::from),
            unit: policy
                .unit
                .filter(|_| count)
                .map(|u| u.as_str().to_string()),
        }
    }
}

pub struct SpaceDefaultRetentionPolicyResource {
    data: ProviderData,
    retention_type: RetentionType,
    type_name: &'static str,
}

impl SpaceDefaultRetentionPolicyResource {
    pub fn release(data: ProviderData) -> Self {
        Self {
            data,
            retention_type: RetentionType::LifecycleRelease,
            type_name: "octopusdeploy_space_default_lifecycle_release_retention_policy",
        }
    }

    pub fn tentacle(data: ProviderData) -> Self {
        Self {
            data,
            retention_type: RetentionType::LifecycleTentacle,
            type_name: "octopusdeploy_space_default_lifecycle_tentacle_retention_policy",
        }
    }

    fn space<'a>(
        &self,
        diags: &mut Diagnostics,
        client: &'a OctopusClient,
        model: &'a SpaceDefaultRetentionPolicyModel,
    ) -> Option<&'a str> {
        let space = client.resolve_space(model.space_id.as_deref());
        if space.is_none() {
            diags.add_error(
                format!("Error managing {}", KIND),
                "space_id is not set and the provider has no default space.",
            );
        }
        space
    }

    /// Fetch the space's policy of this resource's retention type
    async fn fetch(
        &self,
        client: &OctopusClient,
        space: &str,
    ) -> octopusdeploy_client::Result<SpaceDefaultRetentionPolicy> {
        client
            .get_json_query(
                &[space, SpaceDefaultRetentionPolicy::COLLECTION],
                &[("RetentionType", self.retention_type.as_str())],
            )
            .await
    }

    async fn write(&self, diags: &mut Diagnostics, plan: &Value, action: &str) -> Option<Value> {
        let client = self.data.client(diags)?;
        let model: SpaceDefaultRetentionPolicyModel = util::decode(diags, plan)?;
        let space = self.space(diags, client, &model)?;

        tracing::info!(resource = self.type_name, space, "{} {}", action, KIND);
        let mut policy = match self.fetch(client, space).await {
            Ok(policy) => policy,
            Err(e) => {
                util::api_error(diags, action, KIND, &e);
                return None;
            }
        };
        model.apply_to(diags, &mut policy)?;

        match client.update(Some(space), &policy).await {
            Ok(updated) => util::encode(
                diags,
                &SpaceDefaultRetentionPolicyModel::flatten(&updated, Some(space)),
            ),
            Err(e) => {
                util::api_error(diags, action, KIND, &e);
                None
            }
        }
    }
}

#[async_trait]
impl Resource for SpaceDefaultRetentionPolicyResource {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn schema(&self) -> Schema {
        let description = match self.retention_type {
            RetentionType::LifecycleRelease => {
                "Manages the default release retention policy of a space."
            }
            RetentionType::LifecycleTentacle => {
                "Manages the default tentacle retention policy of a space."
            }
        };
        space_default_attributes(
            Schema::new(description)
                .attribute("id", schemas::id())
                .attribute("space_id", schemas::space_id("retention policy")),
        )
    }

    async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value> {
        self.write(diags, plan, "creating").await
    }

    async fn read(&self, diags: &mut Diagnostics, state: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let prior: SpaceDefaultRetentionPolicyModel = util::decode(diags, state)?;
        let Some(id) = prior.id.as_deref() else {
            diags.add_error(format!("Error reading {}", KIND), "The state has no id.");
            return None;
        };
        let space = client.resolve_space(prior.space_id.as_deref());

        match client.get::<SpaceDefaultRetentionPolicy>(space, id).await {
            Ok(policy) => util::encode(
                diags,
                &SpaceDefaultRetentionPolicyModel::flatten(&policy, space),
            ),
            Err(e) if e.is_not_found() => {
                tracing::warn!(resource = self.type_name, id, "{} no longer exists; removing from state", KIND);
                Some(Value::Null)
            }
            Err(e) => {
                util::api_error(diags, "reading", KIND, &e);
                None
            }
        }
    }

    async fn update(&self, diags: &mut Diagnostics, _prior: &Value, plan: &Value) -> Option<Value> {
        self.write(diags, plan, "updating").await
    }

    async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()> {
        let client = self.data.client(diags)?;
        let prior: SpaceDefaultRetentionPolicyModel = util::decode(diags, state)?;
        let space = self.space(diags, client, &prior)?;

        tracing::info!(resource = self.type_name, space, "resetting {} to keep forever", KIND);
        let mut policy = match self.fetch(client, space).await {
            Ok(policy) => policy,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                util::api_error(diags, "deleting", KIND, &e);
                return None;
            }
        };
        policy.strategy = RetentionStrategy::Forever;
        policy.quantity_to_keep = None;
        policy.unit = None;

        match client.update(Some(space), &policy).await {
            Ok(_) => Some(()),
            Err(e) => {
                util::api_error(diags, "deleting", KIND, &e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(strategy: RetentionStrategy) -> SpaceDefaultRetentionPolicy {
        SpaceDefaultRetentionPolicy {
            id: Some("SpaceDefaultRetentionPolicies-1".to_string()),
            space_id: Some("Spaces-1".to_string()),
            retention_type: RetentionType::LifecycleRelease,
            strategy,
            quantity_to_keep: Some(30),
            unit: Some(RetentionUnit::Days),
        }
    }

    #[test]
    fn test_count_round_trip() {
        let server = policy(RetentionStrategy::Count);
        let model = SpaceDefaultRetentionPolicyModel::flatten(&server, None);
        assert_eq!(model.quantity_to_keep, Some(30));
        assert_eq!(model.unit.as_deref(), Some("Days"));

        let mut written = policy(RetentionStrategy::Forever);
        let mut diags = Diagnostics::new();
        model.apply_to(&mut diags, &mut written).unwrap();
        assert_eq!(written, server);
    }

    #[test]
    fn test_forever_drops_count_fields() {
        let model = SpaceDefaultRetentionPolicyModel::flatten(&policy(RetentionStrategy::Forever), None);
        assert_eq!(model.strategy, "Forever");
        assert_eq!(model.quantity_to_keep, None);
        assert_eq!(model.unit, None);

        let mut written = policy(RetentionStrategy::Count);
        model.apply_to(&mut Diagnostics::new(), &mut written).unwrap();
        assert_eq!(written.quantity_to_keep, None);
        assert_eq!(written.unit, None);
    }

    #[test]
    fn test_out_of_range_quantity_is_not_written() {
        let model = SpaceDefaultRetentionPolicyModel {
            strategy: "Count".to_string(),
            quantity_to_keep: Some(4_294_967_301),
            unit: Some("Days".to_string()),
            ..Default::default()
        };
        let mut written = policy(RetentionStrategy::Forever);
        let mut diags = Diagnostics::new();
        assert_eq!(model.apply_to(&mut diags, &mut written), None);
        assert_eq!(written.quantity_to_keep, Some(30));
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Value out of range");

        let schema = space_default_attributes(Schema::default());
        let config = Value::object([
            ("strategy", Value::from("Count")),
            ("quantity_to_keep", Value::from(4_294_967_301_i64)),
            ("unit", Value::from("Days")),
        ]);
        assert_eq!(schema.validate(&config).error_count(), 1);
    }

    #[test]
    fn test_space_falls_back_to_resolved() {
        let mut server = policy(RetentionStrategy::Forever);
        server.space_id = None;
        let model = SpaceDefaultRetentionPolicyModel::flatten(&server, Some("Spaces-2"));
        assert_eq!(model.space_id.as_deref(), Some("Spaces-2"));
    }

    #[test]
    fn test_type_names() {
        let data = ProviderData::new();
        assert_eq!(
            SpaceDefaultRetentionPolicyResource::release(data.clone()).type_name(),
            "octopusdeploy_space_default_lifecycle_release_retention_policy"
        );
        assert_eq!(
            SpaceDefaultRetentionPolicyResource::tentacle(data).type_name(),
            "octopusdeploy_space_default_lifecycle_tentacle_retention_policy"
        );
    }
}
