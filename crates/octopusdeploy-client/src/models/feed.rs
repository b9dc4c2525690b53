use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope, SensitiveValue};

/// Package feed kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedType {
    NuGet,
    Docker,
    Helm,
    GitHub,
}

impl FeedType {
    pub const VALUES: &'static [&'static str] = &["NuGet", "Docker", "Helm", "GitHub"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NuGet => "NuGet",
            Self::Docker => "Docker",
            Self::Helm => "Helm",
            Self::GitHub => "GitHub",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NuGet" => Some(Self::NuGet),
            "Docker" => Some(Self::Docker),
            "Helm" => Some(Self::Helm),
            "GitHub" => Some(Self::GitHub),
            _ => None,
        }
    }
}

/// A package feed
///
/// Kind-specific fields are absent for feed types that do not use them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Feed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub feed_type: FeedType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SensitiveValue>,
    #[serde(default)]
    pub package_acquisition_location_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enhanced_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_attempts: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_retry_backoff_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<String>,
}

impl Feed {
    /// An empty feed of the given kind
    pub fn new(name: impl Into<String>, feed_type: FeedType) -> Self {
        Self {
            id: None,
            name: name.into(),
            feed_type,
            space_id: None,
            feed_uri: None,
            username: None,
            password: None,
            package_acquisition_location_options: Vec::new(),
            is_enhanced_mode: None,
            download_attempts: None,
            download_retry_backoff_seconds: None,
            api_version: None,
            registry_path: None,
        }
    }
}

impl ApiResource for Feed {
    const KIND: &'static str = "Feed";
    const COLLECTION: &'static str = "feeds";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_feed_json() {
        let mut feed = Feed::new("Docker Hub", FeedType::Docker);
        feed.feed_uri = Some("https://index.docker.io".to_string());
        feed.api_version = Some("v2".to_string());
        feed.password = Some(SensitiveValue::new("pw"));

        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["FeedType"], "Docker");
        assert_eq!(json["ApiVersion"], "v2");
        assert_eq!(json["Password"]["NewValue"], "pw");
        assert!(json.get("DownloadAttempts").is_none());
    }
}
