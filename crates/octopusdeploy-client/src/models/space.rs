use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// A space partitioning an Octopus instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Space {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub task_queue_stopped: bool,
    #[serde(default)]
    pub space_managers_teams: Vec<String>,
    #[serde(default)]
    pub space_managers_team_members: Vec<String>,
}

impl ApiResource for Space {
    const KIND: &'static str = "Space";
    const COLLECTION: &'static str = "spaces";
    const SCOPE: Scope = Scope::System;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
