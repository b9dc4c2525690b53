//! `octopusdeploy_team`
//!
//! A team and its scoped user roles. Roles live in their own collection and
//! are reconciled after the team itself is written: grants missing on the
//! server are created, grants the configuration no longer lists are deleted.

use async_trait::async_trait;
use futures::future::join_all;
use octopusdeploy_client::OctopusClient;
use octopusdeploy_client::models::{ExternalSecurityGroup, Resources, ScopedUserRole, Team};
use octopusdeploy_framework::{
    AttrType, Attribute, Block, Diagnostics, Resource, Schema, UseStateForUnknown, Value,
};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderData;
use crate::{schemas, util};

const TYPE_NAME: &str = "octopusdeploy_team";
const KIND: &str = "team";

/// Page size when listing a team's roles
const ROLE_PAGE: &str = "1000";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSecurityGroupModel {
    pub id: String,
    pub display_id_and_name: bool,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRoleModel {
    pub id: Option<String>,
    pub user_role_id: String,
    pub space_id: Option<String>,
    pub environment_ids: Vec<String>,
    pub project_ids: Vec<String>,
    pub project_group_ids: Vec<String>,
    pub tenant_ids: Vec<String>,
}

impl UserRoleModel {
    fn expand(&self, team_id: &str) -> ScopedUserRole {
        ScopedUserRole {
            id: self.id.clone(),
            team_id: team_id.to_string(),
            user_role_id: self.user_role_id.clone(),
            space_id: self.space_id.clone(),
            environment_ids: self.environment_ids.clone(),
            project_ids: self.project_ids.clone(),
            project_group_ids: self.project_group_ids.clone(),
            tenant_ids: self.tenant_ids.clone(),
        }
    }

    fn flatten(role: &ScopedUserRole) -> Self {
        Self {
            id: role.id.clone(),
            user_role_id: role.user_role_id.clone(),
            space_id: role.space_id.clone(),
            environment_ids: role.environment_ids.clone(),
            project_ids: role.project_ids.clone(),
            project_group_ids: role.project_group_ids.clone(),
            tenant_ids: role.tenant_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub users: Vec<String>,
    pub external_security_group: Vec<ExternalSecurityGroupModel>,
    pub user_role: Vec<UserRoleModel>,
}

impl TeamModel {
    pub fn expand(&self) -> Team {
        Team {
            id: self.id.clone(),
            name: self.name.clone(),
            description: util::non_empty(&self.description),
            space_id: self.space_id.clone(),
            member_user_ids: self.users.clone(),
            external_security_groups: self
                .external_security_group
                .iter()
                .map(|g| ExternalSecurityGroup {
                    id: g.id.clone(),
                    display_id_and_name: g.display_id_and_name,
                    display_name: g.display_name.clone(),
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Roles as they should exist on the server for `team_id`
    pub fn expand_roles(&self, team_id: &str) -> Vec<ScopedUserRole> {
        self.user_role.iter().map(|r| r.expand(team_id)).collect()
    }

    pub fn flatten(team: &Team, roles: &[ScopedUserRole]) -> Self {
        Self {
            id: team.id.clone(),
            name: team.name.clone(),
            description: team.description.clone().unwrap_or_default(),
            space_id: team.space_id.clone(),
            users: team.member_user_ids.clone(),
            external_security_group: team
                .external_security_groups
                .iter()
                .map(|g| ExternalSecurityGroupModel {
                    id: g.id.clone(),
                    display_id_and_name: g.display_id_and_name,
                    display_name: g.display_name.clone(),
                })
                .collect(),
            user_role: roles.iter().map(UserRoleModel::flatten).collect(),
        }
    }
}

/// Order server roles the way `desired` lists them; roles not in `desired`
/// follow in server order
pub fn order_roles(mut server: Vec<ScopedUserRole>, desired: &[ScopedUserRole]) -> Vec<ScopedUserRole> {
    let mut ordered = Vec::with_capacity(server.len());
    for want in desired {
        if let Some(pos) = server.iter().position(|r| r.same_grant(want)) {
            ordered.push(server.remove(pos));
        }
    }
    ordered.extend(server);
    ordered
}

fn user_role_block() -> Block {
    Block::list(
        Schema::new("A user role granted to the team, optionally restricted to a scope.")
            .attribute(
                "id",
                Attribute::computed(AttrType::String)
                    .description("The ID of the scoped user role.")
                    .plan_modifier(UseStateForUnknown),
            )
            .attribute(
                "user_role_id",
                Attribute::required(AttrType::String).description("The user role to grant."),
            )
            .attribute(
                "space_id",
                Attribute::optional(AttrType::String)
                    .description("The space the role applies to; unset for system roles."),
            )
            .attribute("environment_ids", schemas::string_set("Restrict the role to these environments."))
            .attribute("project_ids", schemas::string_set("Restrict the role to these projects."))
            .attribute(
                "project_group_ids",
                schemas::string_set("Restrict the role to these project groups."),
            )
            .attribute("tenant_ids", schemas::string_set("Restrict the role to these tenants.")),
    )
}

fn external_security_group_block() -> Block {
    Block::set(
        Schema::new("An external security group whose members belong to the team.")
            .attribute(
                "id",
                Attribute::required(AttrType::String).description("The ID of the external group."),
            )
            .attribute(
                "display_id_and_name",
                schemas::flag("Show both the ID and the name of the group.", false),
            )
            .attribute(
                "display_name",
                Attribute::optional(AttrType::String)
                    .description("The display name of the group.")
                    .default_value(""),
            ),
    )
}

pub struct TeamResource {
    data: ProviderData,
}

impl TeamResource {
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }

    async fn roles(client: &OctopusClient, team_id: &str) -> octopusdeploy_client::Result<Vec<ScopedUserRole>> {
        let page: Resources<ScopedUserRole> = client
            .get_json_query(&["teams", team_id, "scopeduserroles"], &[("take", ROLE_PAGE)])
            .await?;
        Ok(page.items)
    }

    /// Bring the team's roles in line with `desired` and return them in
    /// `desired` order
    async fn reconcile(
        &self,
        diags: &mut Diagnostics,
        client: &OctopusClient,
        team_id: &str,
        desired: &[ScopedUserRole],
    ) -> Option<Vec<ScopedUserRole>> {
        let current = match Self::roles(client, team_id).await {
            Ok(roles) => roles,
            Err(e) => {
                util::api_error(diags, "reading", "scoped user roles", &e);
                return None;
            }
        };

        let stale: Vec<&str> = current
            .iter()
            .filter(|r| !desired.iter().any(|d| d.same_grant(r)))
            .filter_map(|r| r.id.as_deref())
            .collect();
        let missing: Vec<ScopedUserRole> = desired
            .iter()
            .filter(|d| !current.iter().any(|r| r.same_grant(d)))
            .map(|d| ScopedUserRole { id: None, ..d.clone() })
            .collect();
        tracing::debug!(
            team = team_id,
            create = missing.len(),
            delete = stale.len(),
            "reconciling scoped user roles"
        );

        let deletions = join_all(stale.iter().map(|id| client.delete::<ScopedUserRole>(None, id)));
        let creations = join_all(missing.iter().map(|role| client.create(None, role)));
        let (deleted, created) = futures::join!(deletions, creations);

        for result in deleted {
            match result {
                Err(e) if !e.is_not_found() => util::api_error(diags, "deleting", "scoped user role", &e),
                _ => {}
            }
        }
        for result in created {
            if let Err(e) = result {
                util::api_error(diags, "creating", "scoped user role", &e);
            }
        }
        if diags.has_errors() {
            return None;
        }

        match Self::roles(client, team_id).await {
            Ok(roles) => Some(order_roles(roles, desired)),
            Err(e) => {
                util::api_error(diags, "reading", "scoped user roles", &e);
                None
            }
        }
    }

    async fn write_roles(
        &self,
        diags: &mut Diagnostics,
        client: &OctopusClient,
        team: &Team,
        model: &TeamModel,
    ) -> Option<Value> {
        let Some(team_id) = team.id.as_deref() else {
            diags.add_error(format!("Error writing {}", KIND), "The server returned a team without an id.");
            return None;
        };
        let desired = model.expand_roles(team_id);
        let roles = match self.reconcile(diags, client, team_id, &desired).await {
            Some(roles) => roles,
            None => {
                // The team exists now; record it with the roles it actually has
                tracing::warn!(team = team_id, "scoped user roles were not fully applied");
                Self::roles(client, team_id)
                    .await
                    .map(|roles| order_roles(roles, &desired))
                    .unwrap_or_default()
            }
        };
        util::encode(diags, &TeamModel::flatten(team, &roles))
    }
}

#[async_trait]
impl Resource for TeamResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("This resource manages teams in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute("name", schemas::name("team"))
            .attribute("description", schemas::description("team"))
            .attribute("space_id", schemas::space_id("team"))
            .attribute("users", schemas::string_set("IDs of the users in this team."))
            .block("external_security_group", external_security_group_block())
            .block("user_role", user_role_block())
    }

    async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let model: TeamModel = util::decode(diags, plan)?;

        tracing::info!(resource = TYPE_NAME, "creating {}", KIND);
        let team = match client.create(None, &model.expand()).await {
            Ok(team) => team,
            Err(e) => {
                util::api_error(diags, "creating", KIND, &e);
                return None;
            }
        };
        tracing::info!(resource = TYPE_NAME, id = ?team.id, "created {}", KIND);
        self.write_roles(diags, client, &team, &model).await
    }

    async fn read(&self, diags: &mut Diagnostics, state: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let prior: TeamModel = util::decode(diags, state)?;
        let Some(id) = prior.id.as_deref() else {
            diags.add_error(format!("Error reading {}", KIND), "The state has no id.");
            return None;
        };

        let team = match client.get::<Team>(None, id).await {
            Ok(team) => team,
            Err(e) if e.is_not_found() => {
                tracing::warn!(resource = TYPE_NAME, id, "{} no longer exists; removing from state", KIND);
                return Some(Value::Null);
            }
            Err(e) => {
                util::api_error(diags, "reading", KIND, &e);
                return None;
            }
        };
        let roles = match Self::roles(client, id).await {
            Ok(roles) => order_roles(roles, &prior.expand_roles(id)),
            Err(e) => {
                util::api_error(diags, "reading", "scoped user roles", &e);
                return None;
            }
        };
        util::encode(diags, &TeamModel::flatten(&team, &roles))
    }

    async fn update(&self, diags: &mut Diagnostics, _prior: &Value, plan: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let model: TeamModel = util::decode(diags, plan)?;

        tracing::info!(resource = TYPE_NAME, id = ?model.id, "updating {}", KIND);
        let team = match client.update(None, &model.expand()).await {
            Ok(team) => team,
            Err(e) => {
                util::api_error(diags, "updating", KIND, &e);
                return None;
            }
        };
        self.write_roles(diags, client, &team, &model).await
    }

    async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()> {
        let client = self.data.client(diags)?;
        let prior: TeamModel = util::decode(diags, state)?;
        let Some(id) = prior.id.as_deref() else {
            diags.add_error(format!("Error deleting {}", KIND), "The state has no id.");
            return None;
        };

        tracing::info!(resource = TYPE_NAME, id, "deleting {}", KIND);
        match client.delete::<Team>(None, id).await {
            Ok(()) => Some(()),
            Err(e) if e.is_not_found() => Some(()),
            Err(e) => {
                util::api_error(diags, "deleting", KIND, &e);
                None
            }
        }
    }
}
