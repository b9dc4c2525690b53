//! Octopus REST client
//!
//! Generic CRUD over [`ApiResource`] collections. Every request is
//! authenticated with the configured credentials and sent through the
//! selected [`Transport`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::error::{ClientError, Result};
use crate::models::{ApiResource, Resources, Scope, SearchQuery};
use crate::transport::{RedirectionSettings, Transport, build_transport};

/// Page size used when walking a whole collection
const PAGE_SIZE: u32 = 100;

/// Error body returned by the Octopus API
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Octopus API client
#[derive(Clone)]
pub struct OctopusClient {
    address: Url,
    credentials: Credentials,
    space_id: Option<String>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for OctopusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctopusClient")
            .field("address", &self.address.as_str())
            .field("space_id", &self.space_id)
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl OctopusClient {
    /// Create a client, choosing a direct or redirecting transport
    pub fn new(config: ClientConfig, redirection: &RedirectionSettings) -> Result<Self> {
        let transport = build_transport(
            config.address.as_str(),
            redirection,
            Duration::from_secs(config.timeout_seconds),
        )?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client using an explicit transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            address: config.address,
            credentials: config.credentials,
            space_id: config.space_id,
            transport,
        }
    }

    /// Server address
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Default space
    pub fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    /// Resolve the space a request should target
    pub fn resolve_space<'a>(&'a self, space_id: Option<&'a str>) -> Option<&'a str> {
        space_id
            .filter(|s| !s.is_empty())
            .or(self.space_id.as_deref())
    }

    /// Build an API URL from path segments below `/api`
    pub fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.address.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidAddress {
                    url: self.address.to_string(),
                    reason: "address cannot be a base URL".to_string(),
                })?;
            path.pop_if_empty().push("api");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn collection_url<T: ApiResource>(&self, space_id: Option<&str>, id: Option<&str>) -> Result<Url> {
        let mut segments = Vec::with_capacity(3);
        if T::SCOPE == Scope::Space {
            if let Some(space) = self.resolve_space(space_id) {
                segments.push(space);
            }
        }
        segments.push(T::COLLECTION);
        if let Some(id) = id {
            segments.push(id);
        }
        self.api_url(&segments)
    }

    /// Fetch a resource by ID
    pub async fn get<T: ApiResource>(&self, space_id: Option<&str>, id: &str) -> Result<T> {
        let url = self.collection_url::<T>(space_id, Some(id))?;
        self.send(Method::GET, url, None::<&()>)
            .await
            .map_err(|e| not_found_as::<T>(e, id))
    }

    /// Fetch one page of a collection
    pub async fn list<T: ApiResource>(
        &self,
        space_id: Option<&str>,
        query: &SearchQuery,
    ) -> Result<Resources<T>> {
        let mut url = self.collection_url::<T>(space_id, None)?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.send(Method::GET, url, None::<&()>).await
    }

    /// Fetch every matching item, following pages
    pub async fn list_all<T: ApiResource>(
        &self,
        space_id: Option<&str>,
        query: &SearchQuery,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut skip = query.skip.unwrap_or(0);

        loop {
            let mut page_query = query.clone();
            page_query.skip = Some(skip);
            page_query.take = Some(PAGE_SIZE);

            let page: Resources<T> = self.list(space_id, &page_query).await?;
            let received = page.items.len() as u32;
            items.extend(page.items);
            skip += received;

            if received < PAGE_SIZE || skip >= page.total_results {
                break;
            }
        }

        Ok(items)
    }

    /// Create a resource
    pub async fn create<T: ApiResource>(&self, space_id: Option<&str>, resource: &T) -> Result<T> {
        let url = self.collection_url::<T>(space_id, None)?;
        self.send(Method::POST, url, Some(resource)).await
    }

    /// Replace a resource
    pub async fn update<T: ApiResource>(&self, space_id: Option<&str>, resource: &T) -> Result<T> {
        let id = resource.id().ok_or_else(|| ClientError::InvalidConfig {
            message: format!("cannot update {} without an ID", T::KIND),
        })?;
        let url = self.collection_url::<T>(space_id, Some(id))?;
        self.send(Method::PUT, url, Some(resource))
            .await
            .map_err(|e| not_found_as::<T>(e, id))
    }

    /// Delete a resource
    pub async fn delete<T: ApiResource>(&self, space_id: Option<&str>, id: &str) -> Result<()> {
        let url = self.collection_url::<T>(space_id, Some(id))?;
        let response = self.execute(Method::DELETE, url, None::<&()>).await;
        match response {
            Ok(_) => Ok(()),
            Err(e) => Err(not_found_as::<T>(e, id)),
        }
    }

    /// GET an arbitrary path below `/api`
    pub async fn get_json<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R> {
        let url = self.api_url(segments)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    /// GET an arbitrary path below `/api` with query parameters
    pub async fn get_json_query<R: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<R> {
        let mut url = self.api_url(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        self.send(Method::GET, url, None::<&()>).await
    }

    /// PUT a body to an arbitrary path below `/api`
    pub async fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<R> {
        let url = self.api_url(segments)?;
        self.send(Method::PUT, url, Some(body)).await
    }

    async fn send<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<R> {
        let response = self.execute(method, url.clone(), body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::UnexpectedResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut request = reqwest::Request::new(method.clone(), url.clone());
        {
            let headers = request.headers_mut();
            let (name, value) = self.credentials.auth_header();
            let mut value = HeaderValue::from_str(&value).map_err(|e| ClientError::InvalidConfig {
                message: format!("invalid credentials: {}", e),
            })?;
            value.set_sensitive(true);
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ClientError::InvalidConfig {
                    message: format!("invalid auth header name: {}", e),
                }
            })?;
            headers.insert(name, value);
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(payload.into());
        }

        let response = self.transport.execute(request).await?;
        let status = response.status();
        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            transport = self.transport.name(),
            "octopus api request"
        );

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound {
                kind: "Resource".to_string(),
                id: url.path().to_string(),
            }),
            StatusCode::UNAUTHORIZED => Err(ClientError::AuthRequired {
                url: url.to_string(),
            }),
            StatusCode::FORBIDDEN => {
                let body = error_body(response).await;
                Err(ClientError::Forbidden {
                    message: body
                        .error_message
                        .unwrap_or_else(|| format!("access denied to {}", url)),
                })
            }
            _ => {
                let body = error_body(response).await;
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message: body
                        .error_message
                        .unwrap_or_else(|| format!("{} {} failed", method, url)),
                    details: body.errors,
                })
            }
        }
    }
}

async fn error_body(response: reqwest::Response) -> ApiErrorBody {
    match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(_) => ApiErrorBody::default(),
    }
}

fn not_found_as<T: ApiResource>(error: ClientError, id: &str) -> ClientError {
    match error {
        ClientError::NotFound { .. } => ClientError::NotFound {
            kind: T::KIND.to_string(),
            id: id.to_string(),
        },
        other => other,
    }
}
