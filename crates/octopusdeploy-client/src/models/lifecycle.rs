use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope};

/// How long retained items are measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionUnit {
    #[default]
    Days,
    Items,
}

impl RetentionUnit {
    pub const VALUES: &'static [&'static str] = &["Days", "Items"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "Days",
            Self::Items => "Items",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Days" => Some(Self::Days),
            "Items" => Some(Self::Items),
            _ => None,
        }
    }
}

/// How a retention policy decides what to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionStrategy {
    /// Inherit the space default
    Default,
    /// Keep everything
    Forever,
    /// Keep a number of items or days
    Count,
}

impl RetentionStrategy {
    pub const VALUES: &'static [&'static str] = &["Default", "Forever", "Count"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Forever => "Forever",
            Self::Count => "Count",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Default" => Some(Self::Default),
            "Forever" => Some(Self::Forever),
            "Count" => Some(Self::Count),
            _ => None,
        }
    }
}

impl std::fmt::Display for RetentionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retention settings attached to a lifecycle or phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetentionPeriod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RetentionStrategy>,
    #[serde(default)]
    pub quantity_to_keep: i32,
    #[serde(default)]
    pub should_keep_forever: bool,
    #[serde(default)]
    pub unit: RetentionUnit,
}

impl RetentionPeriod {
    /// Keep everything
    pub fn forever() -> Self {
        Self {
            strategy: None,
            quantity_to_keep: 0,
            should_keep_forever: true,
            unit: RetentionUnit::Items,
        }
    }

    /// Keep a number of days or items
    pub fn count(quantity_to_keep: i32, unit: RetentionUnit) -> Self {
        Self {
            strategy: None,
            quantity_to_keep,
            should_keep_forever: false,
            unit,
        }
    }
}

/// A lifecycle phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Phase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub automatic_deployment_targets: Vec<String>,
    #[serde(default)]
    pub optional_deployment_targets: Vec<String>,
    #[serde(default)]
    pub minimum_environments_before_promotion: i32,
    #[serde(default)]
    pub is_optional_phase: bool,
    #[serde(default)]
    pub is_priority_phase: bool,
    #[serde(default)]
    pub release_retention_policy: Option<RetentionPeriod>,
    #[serde(default)]
    pub tentacle_retention_policy: Option<RetentionPeriod>,
}

/// Promotion rules and retention defaults for projects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub release_retention_policy: Option<RetentionPeriod>,
    #[serde(default)]
    pub tentacle_retention_policy: Option<RetentionPeriod>,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl ApiResource for Lifecycle {
    const KIND: &'static str = "Lifecycle";
    const COLLECTION: &'static str = "lifecycles";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Which space default a retention policy governs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionType {
    LifecycleRelease,
    LifecycleTentacle,
}

impl RetentionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LifecycleRelease => "LifecycleRelease",
            Self::LifecycleTentacle => "LifecycleTentacle",
        }
    }
}

/// A space-wide default retention policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpaceDefaultRetentionPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    pub retention_type: RetentionType,
    pub strategy: RetentionStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_to_keep: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<RetentionUnit>,
}

impl ApiResource for SpaceDefaultRetentionPolicy {
    const KIND: &'static str = "Space default retention policy";
    const COLLECTION: &'static str = "spacedefaultretentionpolicies";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_period_without_strategy_omits_field() {
        let json = serde_json::to_value(RetentionPeriod::count(30, RetentionUnit::Days)).unwrap();
        assert!(json.get("Strategy").is_none());
        assert_eq!(json["QuantityToKeep"], 30);
        assert_eq!(json["Unit"], "Days");
    }

    #[test]
    fn test_lifecycle_from_api_json() {
        let lifecycle: Lifecycle = serde_json::from_str(
            r#"{
                "Id": "Lifecycles-1",
                "Name": "Default Lifecycle",
                "SpaceId": "Spaces-1",
                "ReleaseRetentionPolicy": {"Strategy": "Count", "QuantityToKeep": 3, "ShouldKeepForever": false, "Unit": "Items"},
                "TentacleRetentionPolicy": {"QuantityToKeep": 0, "ShouldKeepForever": true, "Unit": "Items"},
                "Phases": [{"Id": "p1", "Name": "Dev", "AutomaticDeploymentTargets": ["Environments-1"], "ReleaseRetentionPolicy": null}]
            }"#,
        )
        .unwrap();

        let release = lifecycle.release_retention_policy.unwrap();
        assert_eq!(release.strategy, Some(RetentionStrategy::Count));
        assert_eq!(release.unit, RetentionUnit::Items);
        assert!(lifecycle.tentacle_retention_policy.unwrap().should_keep_forever);
        assert_eq!(lifecycle.phases[0].automatic_deployment_targets, vec!["Environments-1"]);
        assert!(lifecycle.phases[0].release_retention_policy.is_none());
    }

    #[test]
    fn test_strategy_parse() {
        for value in RetentionStrategy::VALUES {
            assert_eq!(RetentionStrategy::parse(value).unwrap().as_str(), *value);
        }
        assert!(RetentionStrategy::parse("count").is_none());
    }
}
