//! Package feeds: `octopusdeploy_nuget_feed`,
//! `octopusdeploy_docker_container_registry`, `octopusdeploy_helm_feed` and
//! `octopusdeploy_github_repository_feed`
//!
//! All four share the `feeds` collection and differ in `FeedType` and the
//! fields that apply. Feed passwords are write-only and carried over from
//! prior state.

use octopusdeploy_client::models::{Feed, FeedType, SensitiveValue};
use octopusdeploy_framework::{AttrType, Attribute, Schema, UseStateForUnknown};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::{schemas, util};

pub const DEFAULT_DOWNLOAD_ATTEMPTS: i64 = 5;
pub const DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS: i64 = 10;
pub const GITHUB_API_URI: &str = "https://api.github.com";

fn base_schema(description: &str, kind: &str) -> Schema {
    Schema::new(description)
        .attribute("id", schemas::id())
        .attribute("name", schemas::name(kind))
        .attribute("space_id", schemas::space_id(kind))
        .attribute(
            "username",
            Attribute::optional(AttrType::String).description("The username used to access the feed."),
        )
        .attribute("password", schemas::secret("The password used to access the feed."))
        .attribute(
            "package_acquisition_location_options",
            Attribute::optional_computed(AttrType::list_of(AttrType::String))
                .description("Where packages from this feed may be acquired.")
                .plan_modifier(UseStateForUnknown),
        )
}

fn with_download_settings(schema: Schema) -> Schema {
    schema
        .attribute(
            "download_attempts",
            schemas::integer("The number of times a package download is attempted.", DEFAULT_DOWNLOAD_ATTEMPTS),
        )
        .attribute(
            "download_retry_backoff_seconds",
            schemas::integer(
                "The number of seconds to wait between download attempts.",
                DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS,
            ),
        )
}

fn required_uri(description: &str) -> Attribute {
    Attribute::required(AttrType::String).description(description)
}

fn feed(
    name: &str,
    feed_type: FeedType,
    id: &Option<String>,
    space_id: &Option<String>,
    username: &Option<String>,
    password: &Option<String>,
    options: &[String],
) -> Feed {
    let mut feed = Feed::new(name, feed_type);
    feed.id = id.clone();
    feed.space_id = space_id.clone();
    feed.username = username.clone();
    feed.password = SensitiveValue::from_option(password.as_deref());
    feed.package_acquisition_location_options = options.to_vec();
    feed
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NugetFeedModel {
    pub id: Option<String>,
    pub name: String,
    pub space_id: Option<String>,
    pub feed_uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_enhanced_mode: bool,
    pub download_attempts: i64,
    pub download_retry_backoff_seconds: i64,
    pub package_acquisition_location_options: Vec<String>,
}

impl ResourceModel for NugetFeedModel {
    type Api = Feed;

    const TYPE_NAME: &'static str = "octopusdeploy_nuget_feed";
    const KIND: &'static str = "NuGet feed";

    fn schema() -> Schema {
        with_download_settings(base_schema("This resource manages NuGet feeds in Octopus Deploy.", "feed"))
            .attribute("feed_uri", required_uri("The URI of the NuGet feed."))
            .attribute(
                "is_enhanced_mode",
                schemas::flag("Use the enhanced NuGet v2 protocol.", false),
            )
    }

    fn expand(&self) -> Feed {
        let mut api = feed(
            &self.name,
            FeedType::NuGet,
            &self.id,
            &self.space_id,
            &self.username,
            &self.password,
            &self.package_acquisition_location_options,
        );
        api.feed_uri = Some(self.feed_uri.clone());
        api.is_enhanced_mode = Some(self.is_enhanced_mode);
        api.download_attempts = Some(util::api_int(self.download_attempts));
        api.download_retry_backoff_seconds = Some(util::api_int(self.download_retry_backoff_seconds));
        api
    }

    fn flatten(api: &Feed) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            space_id: api.space_id.clone(),
            feed_uri: api.feed_uri.clone().unwrap_or_default(),
            username: api.username.clone(),
            password: None,
            is_enhanced_mode: api.is_enhanced_mode.unwrap_or(false),
            download_attempts: api.download_attempts.map_or(DEFAULT_DOWNLOAD_ATTEMPTS, i64::from),
            download_retry_backoff_seconds: api
                .download_retry_backoff_seconds
                .map_or(DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS, i64::from),
            package_acquisition_location_options: api.package_acquisition_location_options.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.password = prior.password.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerContainerRegistryModel {
    pub id: Option<String>,
    pub name: String,
    pub space_id: Option<String>,
    pub feed_uri: Option<String>,
    pub api_version: Option<String>,
    pub registry_path: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub package_acquisition_location_options: Vec<String>,
}

impl ResourceModel for DockerContainerRegistryModel {
    type Api = Feed;

    const TYPE_NAME: &'static str = "octopusdeploy_docker_container_registry";
    const KIND: &'static str = "Docker container registry";

    fn schema() -> Schema {
        base_schema(
            "This resource manages Docker container registries in Octopus Deploy.",
            "container registry",
        )
        .attribute(
            "feed_uri",
            Attribute::optional(AttrType::String).description("The URI of the registry."),
        )
        .attribute(
            "api_version",
            Attribute::optional(AttrType::String).description("The registry API version, e.g. v2."),
        )
        .attribute(
            "registry_path",
            Attribute::optional(AttrType::String)
                .description("The path below the registry URI where images are stored."),
        )
    }

    fn expand(&self) -> Feed {
        let mut api = feed(
            &self.name,
            FeedType::Docker,
            &self.id,
            &self.space_id,
            &self.username,
            &self.password,
            &self.package_acquisition_location_options,
        );
        api.feed_uri = self.feed_uri.clone();
        api.api_version = self.api_version.clone();
        api.registry_path = self.registry_path.clone();
        api
    }

    fn flatten(api: &Feed) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            space_id: api.space_id.clone(),
            feed_uri: api.feed_uri.clone(),
            api_version: api.api_version.clone(),
            registry_path: api.registry_path.clone(),
            username: api.username.clone(),
            password: None,
            package_acquisition_location_options: api.package_acquisition_location_options.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.password = prior.password.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmFeedModel {
    pub id: Option<String>,
    pub name: String,
    pub space_id: Option<String>,
    pub feed_uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub package_acquisition_location_options: Vec<String>,
}

impl ResourceModel for HelmFeedModel {
    type Api = Feed;

    const TYPE_NAME: &'static str = "octopusdeploy_helm_feed";
    const KIND: &'static str = "Helm feed";

    fn schema() -> Schema {
        base_schema("This resource manages Helm feeds in Octopus Deploy.", "feed")
            .attribute("feed_uri", required_uri("The URI of the Helm repository."))
    }

    fn expand(&self) -> Feed {
        let mut api = feed(
            &self.name,
            FeedType::Helm,
            &self.id,
            &self.space_id,
            &self.username,
            &self.password,
            &self.package_acquisition_location_options,
        );
        api.feed_uri = Some(self.feed_uri.clone());
        api
    }

    fn flatten(api: &Feed) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            space_id: api.space_id.clone(),
            feed_uri: api.feed_uri.clone().unwrap_or_default(),
            username: api.username.clone(),
            password: None,
            package_acquisition_location_options: api.package_acquisition_location_options.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.password = prior.password.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubRepositoryFeedModel {
    pub id: Option<String>,
    pub name: String,
    pub space_id: Option<String>,
    pub feed_uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub download_attempts: i64,
    pub download_retry_backoff_seconds: i64,
    pub package_acquisition_location_options: Vec<String>,
}

impl ResourceModel for GitHubRepositoryFeedModel {
    type Api = Feed;

    const TYPE_NAME: &'static str = "octopusdeploy_github_repository_feed";
    const KIND: &'static str = "GitHub repository feed";

    fn schema() -> Schema {
        with_download_settings(base_schema(
            "This resource manages GitHub repository feeds in Octopus Deploy.",
            "feed",
        ))
        .attribute(
            "feed_uri",
            Attribute::optional(AttrType::String)
                .description("The GitHub API URI.")
                .default_value(GITHUB_API_URI),
        )
    }

    fn expand(&self) -> Feed {
        let mut api = feed(
            &self.name,
            FeedType::GitHub,
            &self.id,
            &self.space_id,
            &self.username,
            &self.password,
            &self.package_acquisition_location_options,
        );
        api.feed_uri = Some(self.feed_uri.clone());
        api.download_attempts = Some(util::api_int(self.download_attempts));
        api.download_retry_backoff_seconds = Some(util::api_int(self.download_retry_backoff_seconds));
        api
    }

    fn flatten(api: &Feed) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            space_id: api.space_id.clone(),
            feed_uri: api.feed_uri.clone().unwrap_or_else(|| GITHUB_API_URI.to_string()),
            username: api.username.clone(),
            password: None,
            download_attempts: api.download_attempts.map_or(DEFAULT_DOWNLOAD_ATTEMPTS, i64::from),
            download_retry_backoff_seconds: api
                .download_retry_backoff_seconds
                .map_or(DEFAULT_DOWNLOAD_RETRY_BACKOFF_SECONDS, i64::from),
            package_acquisition_location_options: api.package_acquisition_location_options.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.password = prior.password.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopusdeploy_framework::Value;

    fn without_password(mut feed: Feed) -> Feed {
        feed.password = None;
        feed
    }

    #[test]
    fn test_nuget_round_trip() {
        let mut api = Feed::new("NuGet.org", FeedType::NuGet);
        api.id = Some("Feeds-1".to_string());
        api.space_id = Some("Spaces-1".to_string());
        api.feed_uri = Some("https://api.nuget.org/v3/index.json".to_string());
        api.username = Some("builder".to_string());
        api.is_enhanced_mode = Some(true);
        api.download_attempts = Some(3);
        api.download_retry_backoff_seconds = Some(20);
        api.package_acquisition_location_options = vec!["Server".to_string(), "ExecutionTarget".to_string()];

        assert_eq!(NugetFeedModel::flatten(&api).expand(), api);
    }

    #[test]
    fn test_docker_round_trip() {
        let mut api = Feed::new("Docker Hub", FeedType::Docker);
        api.id = Some("Feeds-2".to_string());
        api.feed_uri = Some("https://index.docker.io".to_string());
        api.api_version = Some("v2".to_string());
        assert_eq!(DockerContainerRegistryModel::flatten(&api).expand(), api);

        let bare = Feed::new("Bare", FeedType::Docker);
        assert_eq!(DockerContainerRegistryModel::flatten(&bare).expand(), bare);
    }

    #[test]
    fn test_helm_and_github_round_trip() {
        let mut helm = Feed::new("Charts", FeedType::Helm);
        helm.feed_uri = Some("https://charts.example.com".to_string());
        assert_eq!(HelmFeedModel::flatten(&helm).expand(), helm);

        let mut github = Feed::new("GitHub", FeedType::GitHub);
        github.feed_uri = Some(GITHUB_API_URI.to_string());
        github.download_attempts = Some(5);
        github.download_retry_backoff_seconds = Some(10);
        assert_eq!(GitHubRepositoryFeedModel::flatten(&github).expand(), github);
    }

    #[test]
    fn test_password_is_sent_and_preserved() {
        let model = HelmFeedModel {
            name: "Charts".to_string(),
            feed_uri: "https://charts.example.com".to_string(),
            username: Some("robot".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let sent = model.expand();
        assert_eq!(sent.password, Some(SensitiveValue::new("hunter2")));

        let mut returned = without_password(sent);
        returned.id = Some("Feeds-3".to_string());
        let mut state = HelmFeedModel::flatten(&returned);
        assert_eq!(state.password, None);
        state.preserve(&model);
        assert_eq!(state.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_schema_defaults() {
        let schema = GitHubRepositoryFeedModel::schema();
        assert_eq!(schema.attributes["feed_uri"].default, Some(Value::from(GITHUB_API_URI)));
        assert_eq!(schema.attributes["download_attempts"].default, Some(Value::from(5)));
        assert!(schema.attributes["password"].sensitive);
        assert!(NugetFeedModel::schema().attributes["feed_uri"].required);
    }
}
