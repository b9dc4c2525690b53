use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// An external (Active Directory, Entra ID, ...) group linked to a team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalSecurityGroup {
    pub id: String,
    #[serde(default)]
    pub display_id_and_name: bool,
    #[serde(default)]
    pub display_name: String,
}

/// A team of users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub member_user_ids: Vec<String>,
    #[serde(default)]
    pub external_security_groups: Vec<ExternalSecurityGroup>,
    #[serde(default)]
    pub can_be_deleted: bool,
    #[serde(default)]
    pub can_be_renamed: bool,
    #[serde(default)]
    pub can_change_members: bool,
    #[serde(default)]
    pub can_change_roles: bool,
}

impl ApiResource for Team {
    const KIND: &'static str = "Team";
    const COLLECTION: &'static str = "teams";
    const SCOPE: Scope = Scope::System;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// A user role granted to a team, optionally restricted to a scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScopedUserRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub team_id: String,
    pub user_role_id: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub environment_ids: Vec<String>,
    #[serde(default)]
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub project_group_ids: Vec<String>,
    #[serde(default)]
    pub tenant_ids: Vec<String>,
}

impl ScopedUserRole {
    /// Whether two grants cover the same role and scope, ignoring IDs and
    /// ordering
    pub fn same_grant(&self, other: &ScopedUserRole) -> bool {
        fn sorted(ids: &[String]) -> Vec<&String> {
            let mut ids: Vec<&String> = ids.iter().collect();
            ids.sort();
            ids
        }

        self.team_id == other.team_id
            && self.user_role_id == other.user_role_id
            && self.space_id == other.space_id
            && sorted(&self.environment_ids) == sorted(&other.environment_ids)
            && sorted(&self.project_ids) == sorted(&other.project_ids)
            && sorted(&self.project_group_ids) == sorted(&other.project_group_ids)
            && sorted(&self.tenant_ids) == sorted(&other.tenant_ids)
    }
}

impl ApiResource for ScopedUserRole {
    const KIND: &'static str = "Scoped user role";
    const COLLECTION: &'static str = "scopeduserroles";
    const SCOPE: Scope = Scope::System;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
