//! `octopusdeploy_space`

use async_trait::async_trait;
use octopusdeploy_client::models::Space;
use octopusdeploy_framework::{AttributePath, Diagnostics, Resource, Schema, Value};
use serde::{Deserialize, Serialize};

use super::{CollectionResource, ResourceModel};
use crate::provider::ProviderData;
use crate::{schemas, util};

/// Prefix of the team Octopus creates for every space's managers
const SPACE_MANAGERS_TEAM_PREFIX: &str = "teams-spacemanagers-";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceModel {
    pub id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub is_default: bool,
    pub is_task_queue_stopped: bool,
    pub space_managers_teams: Vec<String>,
    pub space_managers_team_members: Vec<String>,
}

impl ResourceModel for SpaceModel {
    type Api = Space;

    const TYPE_NAME: &'static str = "octopusdeploy_space";
    const KIND: &'static str = "space";

    fn schema() -> Schema {
        Schema::new("This resource manages spaces in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("space"))
            .attribute("slug", schemas::slug("space"))
            .attribute("description", schemas::description("space"))
            .attribute("is_default", schemas::flag("Whether this is the default space.", false))
            .attribute(
                "is_task_queue_stopped",
                schemas::flag("Whether the task queue of this space is stopped.", false),
            )
            .attribute(
                "space_managers_teams",
                schemas::string_set("IDs of the teams that manage this space."),
            )
            .attribute(
                "space_managers_team_members",
                schemas::string_set("IDs of the users that manage this space."),
            )
    }

    fn expand(&self) -> Space {
        Space {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: util::non_empty(&self.description),
            is_default: self.is_default,
            task_queue_stopped: self.is_task_queue_stopped,
            space_managers_teams: self.space_managers_teams.clone(),
            space_managers_team_members: self.space_managers_team_members.clone(),
        }
    }

    fn flatten(api: &Space) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            slug: api.slug.clone(),
            description: api.description.clone().unwrap_or_default(),
            is_default: api.is_default,
            is_task_queue_stopped: api.task_queue_stopped,
            space_managers_teams: api
                .space_managers_teams
                .iter()
                .filter(|t| !t.starts_with(SPACE_MANAGERS_TEAM_PREFIX))
                .cloned()
                .collect(),
            space_managers_team_members: api.space_managers_team_members.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        None
    }

    fn validate(config: &Value, diags: &mut Diagnostics) {
        let teams = config.get("space_managers_teams");
        let members = config.get("space_managers_team_members");
        if teams.is_unknown() || members.is_unknown() {
            return;
        }
        let empty = |v: &Value| v.as_elements().is_none_or(|e| e.is_empty());
        if empty(teams) && empty(members) {
            diags.add_attribute_error(
                AttributePath::new("space_managers_teams"),
                "Missing space managers",
                "At least one of space_managers_teams or space_managers_team_members must be set.",
            );
        }
    }
}

/// Spaces with a running task queue cannot be deleted, so delete stops the
/// queue first
pub struct SpaceResource {
    inner: CollectionResource<SpaceModel>,
}

impl SpaceResource {
    pub fn new(data: ProviderData) -> Self {
        Self {
            inner: CollectionResource::new(data),
        }
    }
}

#[async_trait]
impl Resource for SpaceResource {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn schema(&self) -> Schema {
        self.inner.schema()
    }

    async fn validate(&self, diags: &mut Diagnostics, config: &Value) {
        self.inner.validate(diags, config).await
    }

    async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value> {
        self.inner.create(diags, plan).await
    }

    async fn read(&self, diags: &mut Diagnostics, state: &Value) -> Option<Value> {
        self.inner.read(diags, state).await
    }

    async fn update(&self, diags: &mut Diagnostics, prior: &Value, plan: &Value) -> Option<Value> {
        self.inner.update(diags, prior, plan).await
    }

    async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()> {
        let client = self.inner.data.client(diags)?;
        let prior: SpaceModel = util::decode(diags, state)?;
        let Some(id) = prior.id.as_deref() else {
            diags.add_error("Error deleting space", "The state has no id.");
            return None;
        };

        let mut space = match client.get::<Space>(None, id).await {
            Ok(space) => space,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                util::api_error(diags, "deleting", SpaceModel::KIND, &e);
                return None;
            }
        };
        if !space.task_queue_stopped {
            tracing::info!(resource = SpaceModel::TYPE_NAME, id, "stopping task queue before delete");
            space.task_queue_stopped = true;
            if let Err(e) = client.update(None, &space).await {
                util::api_error(diags, "deleting", SpaceModel::KIND, &e);
                return None;
            }
        }
        self.inner.delete(diags, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_hides_space_managers_team() {
        let space = Space {
            id: Some("Spaces-2".to_string()),
            name: "Platform".to_string(),
            slug: Some("platform".to_string()),
            space_managers_teams: vec![
                "teams-spacemanagers-Spaces-2".to_string(),
                "Teams-7".to_string(),
            ],
            ..Default::default()
        };
        let model = SpaceModel::flatten(&space);
        assert_eq!(model.space_managers_teams, vec!["Teams-7"]);
        assert_eq!(model.expand().space_managers_teams, vec!["Teams-7"]);
    }

    #[test]
    fn test_round_trip() {
        let space = Space {
            id: Some("Spaces-3".to_string()),
            name: "Data".to_string(),
            slug: Some("data".to_string()),
            description: Some("Data team".to_string()),
            is_default: false,
            task_queue_stopped: true,
            space_managers_teams: vec!["Teams-1".to_string()],
            space_managers_team_members: vec!["Users-1".to_string()],
        };
        assert_eq!(SpaceModel::flatten(&space).expand(), space);
    }

    #[test]
    fn test_validate_requires_managers() {
        let mut diags = Diagnostics::new();
        SpaceModel::validate(
            &Value::object([
                ("space_managers_teams", Value::Set(Vec::new())),
                ("space_managers_team_members", Value::Null),
            ]),
            &mut diags,
        );
        assert_eq!(diags.error_count(), 1);

        let mut diags = Diagnostics::new();
        SpaceModel::validate(
            &Value::object([
                ("space_managers_teams", Value::Null),
                ("space_managers_team_members", Value::string_list(["Users-1"])),
            ]),
            &mut diags,
        );
        assert!(diags.is_empty());
    }
}
