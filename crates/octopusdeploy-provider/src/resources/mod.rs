//! Resources
//!
//! Most resources map one Terraform model onto one API collection and are
//! served by [`CollectionResource`]. Resources with extra API calls (teams,
//! variables, spaces, space default retention policies) implement
//! [`Resource`] themselves.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use octopusdeploy_client::models::ApiResource;
use octopusdeploy_framework::{Diagnostics, Resource, Schema, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::deprecations::deprecated_resource_disabled;
use crate::provider::ProviderData;
use crate::util;

pub mod account;
pub mod environment;
pub mod feed;
pub mod library_variable_set;
pub mod lifecycle;
pub mod project;
pub mod project_group;
pub mod space;
pub mod space_default_retention_policy;
pub mod team;
pub mod tenant;
pub mod variable;

/// Every resource the provider serves
pub fn all(data: &ProviderData) -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(CollectionResource::<environment::EnvironmentModel>::new(data.clone())),
        Arc::new(CollectionResource::<project_group::ProjectGroupModel>::new(data.clone())),
        Arc::new(CollectionResource::<project::ProjectModel>::new(data.clone())),
        Arc::new(CollectionResource::<lifecycle::LifecycleModel>::new(data.clone())),
        Arc::new(space_default_retention_policy::SpaceDefaultRetentionPolicyResource::release(data.clone())),
        Arc::new(space_default_retention_policy::SpaceDefaultRetentionPolicyResource::tentacle(data.clone())),
        Arc::new(team::TeamResource::new(data.clone())),
        Arc::new(CollectionResource::<feed::NugetFeedModel>::new(data.clone())),
        Arc::new(CollectionResource::<feed::DockerContainerRegistryModel>::new(data.clone())),
        Arc::new(CollectionResource::<feed::HelmFeedModel>::new(data.clone())),
        Arc::new(CollectionResource::<feed::GitHubRepositoryFeedModel>::new(data.clone())),
        Arc::new(CollectionResource::<account::UsernamePasswordAccountModel>::new(data.clone())),
        Arc::new(CollectionResource::<account::TokenAccountModel>::new(data.clone())),
        Arc::new(CollectionResource::<account::AwsAccountModel>::new(data.clone())),
        Arc::new(CollectionResource::<account::AzureServicePrincipalModel>::new(data.clone())),
        Arc::new(CollectionResource::<account::AzureSubscriptionAccountModel>::new(data.clone())),
        Arc::new(variable::VariableResource::new(data.clone())),
        Arc::new(CollectionResource::<tenant::TenantModel>::new(data.clone())),
        Arc::new(space::SpaceResource::new(data.clone())),
        Arc::new(CollectionResource::<library_variable_set::LibraryVariableSetModel>::new(data.clone())),
    ]
}

/// Terraform model of a resource stored in a single API collection
pub trait ResourceModel: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Api: ApiResource;

    const TYPE_NAME: &'static str;

    /// Kind used in diagnostics, e.g. "environment"
    const KIND: &'static str;

    /// Reversal key when the resource is deprecated and disabled
    const DEPRECATION_KEY: Option<&'static str> = None;

    fn schema() -> Schema;

    /// Terraform model to API object
    fn expand(&self) -> Self::Api;

    /// API object to Terraform model
    fn flatten(api: &Self::Api) -> Self;

    fn id(&self) -> Option<&str>;

    fn space_id(&self) -> Option<&str>;

    /// Carry over what the API does not echo back (secrets, blocks the
    /// configuration left out) from the model that was sent or stored
    fn preserve(&mut self, _prior: &Self) {}

    /// Checks beyond what the schema expresses
    fn validate(_config: &Value, _diags: &mut Diagnostics) {}
}

/// CRUD over one API collection
pub struct CollectionResource<M> {
    data: ProviderData,
    model: PhantomData<fn() -> M>,
}

impl<M: ResourceModel> CollectionResource<M> {
    pub fn new(data: ProviderData) -> Self {
        Self {
            data,
            model: PhantomData,
        }
    }

    /// False, with an error diagnostic, when the resource is deprecated and
    /// not re-enabled
    fn enabled(&self, diags: &mut Diagnostics) -> bool {
        match M::DEPRECATION_KEY {
            Some(key) if !self.data.deprecations().is_enabled(key) => {
                deprecated_resource_disabled(diags, M::TYPE_NAME, key);
                false
            }
            _ => true,
        }
    }

    fn state(&self, diags: &mut Diagnostics, api: &M::Api, prior: &M) -> Option<Value> {
        let mut model = M::flatten(api);
        model.preserve(prior);
        util::encode(diags, &model)
    }
}

#[async_trait]
impl<M: ResourceModel> Resource for CollectionResource<M> {
    fn type_name(&self) -> &str {
        M::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        M::schema()
    }

    async fn validate(&self, diags: &mut Diagnostics, config: &Value) {
        if self.enabled(diags) {
            M::validate(config, diags);
        }
    }

    async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value> {
        if !self.enabled(diags) {
            return None;
        }
        let client = self.data.client(diags)?;
        let model: M = util::decode(diags, plan)?;

        tracing::info!(resource = M::TYPE_NAME, "creating {}", M::KIND);
        let created = match client.create(model.space_id(), &model.expand()).await {
            Ok(created) => created,
            Err(e) => {
                util::api_error(diags, "creating", M::KIND, &e);
                return None;
            }
        };
        tracing::info!(resource = M::TYPE_NAME, id = ?created.id(), "created {}", M::KIND);
        self.state(diags, &created, &model)
    }

    async fn read(&self, diags: &mut Diagnostics, state: &Value) -> Option<Value> {
        if !self.enabled(diags) {
            return None;
        }
        let client = self.data.client(diags)?;
        let prior: M = util::decode(diags, state)?;
        let Some(id) = prior.id() else {
            diags.add_error(format!("Error reading {}", M::KIND), "The state has no id.");
            return None;
        };

        match client.get::<M::Api>(prior.space_id(), id).await {
            Ok(api) => self.state(diags, &api, &prior),
            Err(e) if e.is_not_found() => {
                tracing::warn!(resource = M::TYPE_NAME, id, "{} no longer exists; removing from state", M::KIND);
                Some(Value::Null)
            }
            Err(e) => {
                util::api_error(diags, "reading", M::KIND, &e);
                None
            }
        }
    }

    async fn update(&self, diags: &mut Diagnostics, _prior: &Value, plan: &Value) -> Option<Value> {
        if !self.enabled(diags) {
            return None;
        }
        let client = self.data.client(diags)?;
        let model: M = util::decode(diags, plan)?;

        tracing::info!(resource = M::TYPE_NAME, id = ?model.id(), "updating {}", M::KIND);
        match client.update(model.space_id(), &model.expand()).await {
            Ok(updated) => self.state(diags, &updated, &model),
            Err(e) => {
                util::api_error(diags, "updating", M::KIND, &e);
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()> {
        if !self.enabled(diags) {
            return None;
        }
        let client = self.data.client(diags)?;
        let prior: M = util::decode(diags, state)?;
        let Some(id) = prior.id() else {
            diags.add_error(format!("Error deleting {}", M::KIND), "The state has no id.");
            return None;
        };

        tracing::info!(resource = M::TYPE_NAME, id, "deleting {}", M::KIND);
        match client.delete::<M::Api>(prior.space_id(), id).await {
            Ok(()) => Some(()),
            Err(e) if e.is_not_found() => {
                tracing::info!(resource = M::TYPE_NAME, id, "{} already deleted", M::KIND);
                Some(())
            }
            Err(e) => {
                util::api_error(diags, "deleting", M::KIND, &e);
                None
            }
        }
    }
}
