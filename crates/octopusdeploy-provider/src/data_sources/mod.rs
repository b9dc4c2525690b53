//! Data sources
//!
//! Every data source searches one API collection by `ids`, `partial_name`,
//! `skip` and `take` and returns the page as a list of objects.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use octopusdeploy_client::models::{ApiResource, SearchQuery};
use octopusdeploy_framework::validators::at_least;
use octopusdeploy_framework::{AttrType, Attribute, DataSource, Diagnostics, Schema, Value};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderData;
use crate::util;

pub mod environments;
pub mod feeds;
pub mod lifecycles;
pub mod project_groups;
pub mod spaces;

/// Results returned when `take` is not set
pub const DEFAULT_TAKE: i64 = 1;

/// Every data source the provider serves
pub fn all(data: &ProviderData) -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(SearchDataSource::<environments::Environments>::new(data.clone())),
        Arc::new(SearchDataSource::<project_groups::ProjectGroups>::new(data.clone())),
        Arc::new(SearchDataSource::<lifecycles::Lifecycles>::new(data.clone())),
        Arc::new(SearchDataSource::<feeds::Feeds>::new(data.clone())),
        Arc::new(SearchDataSource::<spaces::Spaces>::new(data.clone())),
    ]
}

/// A searchable collection and the shape of one result
pub trait SearchModel: Send + Sync + 'static {
    type Api: ApiResource;
    type Item: Serialize;

    const TYPE_NAME: &'static str;

    /// Attribute holding the results
    const RESULTS: &'static str;

    /// Plural kind used in descriptions and diagnostics
    const KIND: &'static str;

    /// Whether the collection lives in a space
    const SPACE_SCOPED: bool = true;

    /// Object type of one result
    fn item_type() -> AttrType;

    fn item(api: &Self::Api) -> Self::Item;

    /// Attributes beyond the common search parameters
    fn extra_attributes(schema: Schema) -> Schema {
        schema
    }

    /// Collection-specific query parameters taken from the configuration
    fn filters(_config: &Value, query: SearchQuery) -> SearchQuery {
        query
    }
}

/// Object type from field names and types
pub fn object_type(fields: &[(&str, AttrType)]) -> AttrType {
    AttrType::Object(
        fields
            .iter()
            .map(|(name, ty)| (name.to_string(), ty.clone()))
            .collect::<BTreeMap<_, _>>(),
    )
}

/// Common search parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SearchConfig {
    space_id: Option<String>,
    ids: Vec<String>,
    partial_name: Option<String>,
    skip: Option<i64>,
    take: Option<i64>,
}

impl SearchConfig {
    fn query(&self) -> SearchQuery {
        let mut query = SearchQuery::new()
            .skip(util::page_param(self.skip.unwrap_or(0)))
            .take(util::page_param(self.take.unwrap_or(DEFAULT_TAKE)));
        if !self.ids.is_empty() {
            query = query.ids(self.ids.iter().cloned());
        }
        if let Some(name) = self.partial_name.as_deref().filter(|n| !n.is_empty()) {
            query = query.partial_name(name);
        }
        query
    }
}

pub struct SearchDataSource<M> {
    data: ProviderData,
    model: PhantomData<fn() -> M>,
}

impl<M: SearchModel> SearchDataSource<M> {
    pub fn new(data: ProviderData) -> Self {
        Self {
            data,
            model: PhantomData,
        }
    }
}

#[async_trait]
impl<M: SearchModel> DataSource for SearchDataSource<M> {
    fn type_name(&self) -> &str {
        M::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new(format!("Provides information about existing {}.", M::KIND))
            .attribute(
                "id",
                Attribute::computed(AttrType::String).description("An auto-generated identifier for this search."),
            );
        if M::SPACE_SCOPED {
            schema = schema.attribute(
                "space_id",
                Attribute::optional(AttrType::String).description("The space to search."),
            );
        }
        let schema = schema
            .attribute(
                "ids",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .description(format!("A filter to search by a list of IDs of {}.", M::KIND)),
            )
            .attribute(
                "partial_name",
                Attribute::optional(AttrType::String).description("A filter to search by a partial name."),
            )
            .attribute(
                "skip",
                Attribute::optional_computed(AttrType::Int64)
                    .description("A filter to specify the number of items to skip in the response.")
                    .validator(at_least(0)),
            )
            .attribute(
                "take",
                Attribute::optional_computed(AttrType::Int64)
                    .description("A filter to specify the number of items to take (or return) in the response.")
                    .validator(at_least(0)),
            )
            .attribute(
                M::RESULTS,
                Attribute::computed(AttrType::list_of(M::item_type()))
                    .description(format!("A list of {} that match the filter(s).", M::KIND)),
            );
        M::extra_attributes(schema)
    }

    async fn read(&self, diags: &mut Diagnostics, config: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let search: SearchConfig = util::decode(diags, config)?;
        let query = M::filters(config, search.query());
        let space_id = if M::SPACE_SCOPED {
            search.space_id.as_deref()
        } else {
            None
        };

        tracing::debug!(data_source = M::TYPE_NAME, ?query, "searching {}", M::KIND);
        let page = match client.list::<M::Api>(space_id, &query).await {
            Ok(page) => page,
            Err(e) => {
                util::api_error(diags, "reading", M::KIND, &e);
                return None;
            }
        };
        let items: Vec<M::Item> = page.items.iter().map(M::item).collect();
        let results = util::encode(diags, &items)?;

        Some(
            config
                .clone()
                .with("id", Value::from(util::timestamp_id()))
                .with("skip", Value::from(search.skip.unwrap_or(0)))
                .with("take", Value::from(search.take.unwrap_or(DEFAULT_TAKE)))
                .with(M::RESULTS, results),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_config_query() {
        let search = SearchConfig {
            ids: vec!["Environments-1".to_string()],
            partial_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            search.query().to_pairs(),
            vec![
                ("ids".to_string(), "Environments-1".to_string()),
                ("skip".to_string(), "0".to_string()),
                ("take".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_schemas() {
        let data = ProviderData::new();
        for source in all(&data) {
            let schema = source.schema();
            assert!(schema.attributes.contains_key("partial_name"), "{}", source.type_name());
            assert!(schema.attributes["id"].computed);
        }
        let spaces = SearchDataSource::<spaces::Spaces>::new(data).schema();
        assert!(!spaces.attributes.contains_key("space_id"));
    }
}
