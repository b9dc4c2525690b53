//! `octopusdeploy_feeds`

use octopusdeploy_client::models::{Feed, FeedType, SearchQuery};
use octopusdeploy_framework::validators::one_of;
use octopusdeploy_framework::{AttrType, Attribute, Schema, Value};
use serde::Serialize;

use super::{SearchModel, object_type};

/// A found feed; credentials are never returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub id: Option<String>,
    pub name: String,
    pub feed_type: String,
    pub feed_uri: Option<String>,
    pub space_id: Option<String>,
    pub username: Option<String>,
    pub package_acquisition_location_options: Vec<String>,
}

pub struct Feeds;

impl SearchModel for Feeds {
    type Api = Feed;
    type Item = FeedItem;

    const TYPE_NAME: &'static str = "octopusdeploy_feeds";
    const RESULTS: &'static str = "feeds";
    const KIND: &'static str = "feeds";

    fn item_type() -> AttrType {
        object_type(&[
            ("id", AttrType::String),
            ("name", AttrType::String),
            ("feed_type", AttrType::String),
            ("feed_uri", AttrType::String),
            ("space_id", AttrType::String),
            ("username", AttrType::String),
            (
                "package_acquisition_location_options",
                AttrType::list_of(AttrType::String),
            ),
        ])
    }

    fn item(api: &Feed) -> FeedItem {
        FeedItem {
            id: api.id.clone(),
            name: api.name.clone(),
            feed_type: api.feed_type.as_str().to_string(),
            feed_uri: api.feed_uri.clone(),
            space_id: api.space_id.clone(),
            username: api.username.clone(),
            package_acquisition_location_options: api.package_acquisition_location_options.clone(),
        }
    }

    fn extra_attributes(schema: Schema) -> Schema {
        schema.attribute(
            "feed_type",
            Attribute::optional(AttrType::String)
                .description(format!(
                    "A filter to search by feed type. Valid values are {}.",
                    FeedType::VALUES.join(", ")
                ))
                .validator(one_of(FeedType::VALUES)),
        )
    }

    fn filters(config: &Value, query: SearchQuery) -> SearchQuery {
        match config.get("feed_type").as_str() {
            Some(feed_type) => query.filter("feedType", feed_type),
            None => query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_type_filter() {
        let config = Value::object([("feed_type", Value::from("Docker"))]);
        let query = Feeds::filters(&config, SearchQuery::new());
        assert_eq!(query.filters, vec![("feedType".to_string(), "Docker".to_string())]);

        let query = Feeds::filters(&Value::object([("feed_type", Value::Null)]), SearchQuery::new());
        assert!(query.filters.is_empty());
    }
}
