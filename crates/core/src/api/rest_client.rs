use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::expense::Expense;

use super::response::{ApiResponse, ListPayload, PaginatedResponse};
use super::traits::{EntityApi, QueryParams};

/// Collection path for expenses.
pub const EXPENSES_ENTITY: &str = "expenses";

/// Collection path for categories.
pub const CATEGORIES_ENTITY: &str = "categories";

/// Generic CRUD-over-HTTP client for the expenses API.
///
/// - Every request carries the configured headers (JSON content type by default).
/// - Responses are `ApiResponse` envelopes; the payload is taken from `data`.
/// - Any non-2xx status or transport failure is an error. There is no retry.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    config: ApiConfig,
}

impl RestClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Self::build_client(&config),
            config,
        }
    }

    /// Client for the default hosted API.
    pub fn with_defaults() -> Self {
        Self::new(ApiConfig::default())
    }

    fn build_client(config: &ApiConfig) -> Client {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = config;
        builder.build().unwrap_or_else(|_| Client::new())
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Merge extra headers (e.g. `Authorization`) into the defaults.
    pub fn set_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.config.headers.insert(name.into(), value.into());
        }
    }

    /// Point the client at another server (environment switching).
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.config.base_url = base_url.into();
    }

    /// Change the per-request timeout. Rebuilds the HTTP client.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
        self.client = Self::build_client(&self.config);
    }

    /// Absolute URL for `path` (e.g. `/expenses/42`) with `params` appended
    /// as a query string in the given order.
    pub fn endpoint_url(&self, path: &str, params: &QueryParams) -> Result<Url, CoreError> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}")).map_err(|e| {
            CoreError::Config(format!("Invalid API URL '{base}/{path}': {e}"))
        })?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// URL of one item: `{base}/{entity}/{id}`. The id is percent-encoded as a
    /// single path segment.
    pub fn item_url(&self, entity: &str, id: &str) -> Result<Url, CoreError> {
        let mut url = self.endpoint_url(entity, &[])?;
        let base = url.to_string();
        url.path_segments_mut()
            .map_err(|()| CoreError::Config(format!("API URL '{base}' cannot take a path")))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn header_map(&self) -> Result<HeaderMap, CoreError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CoreError::Config(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CoreError::Config(format!("Invalid header value for '{name}': {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Send one request and fail on any non-2xx status.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, CoreError> {
        let path = url.path().to_string();
        debug!(method = %method, path = %path, "Sending API request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.header_map()?);
        if let Some(body) = body.filter(|_| method != Method::GET) {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            let err = CoreError::from(e);
            warn!(method = %method, path = %path, error = %err, "API request failed");
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                "API returned an error status"
            );
            return Err(CoreError::Api {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status.as_u16()),
            });
        }

        Ok(response)
    }

    /// Send a request and decode the `data` payload of the envelope.
    async fn request_data<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T, CoreError> {
        let path = url.path().to_string();
        let response = self.send(method, url, body).await?;
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            CoreError::Deserialization(format!("Failed to parse response from {path}: {e}"))
        })?;
        Ok(envelope.data)
    }

    // ── Generic CRUD ────────────────────────────────────────────────

    /// `GET /{entity}` with optional query parameters.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        entity: &str,
        params: &QueryParams,
    ) -> Result<PaginatedResponse<T>, CoreError> {
        let url = self.endpoint_url(entity, params)?;
        let payload: ListPayload<T> = self.request_data(Method::GET, url, None).await?;
        Ok(payload.into())
    }

    /// `GET /{entity}/{id}`
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        entity: &str,
        id: &str,
    ) -> Result<T, CoreError> {
        let url = self.item_url(entity, id)?;
        self.request_data(Method::GET, url, None).await
    }

    /// `POST /{entity}`
    pub async fn save_new<T, B>(&self, entity: &str, body: &B) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(entity, &[])?;
        let body = to_json_body(body)?;
        self.request_data(Method::POST, url, Some(body)).await
    }

    /// `PUT /{entity}/{id}`. The `id` field, if present in `body`, is not sent.
    pub async fn update<T, B>(&self, entity: &str, id: &str, body: &B) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.item_url(entity, id)?;
        let body = without_id(to_json_body(body)?);
        self.request_data(Method::PUT, url, Some(body)).await
    }

    /// `PATCH /{entity}/{id}`. The `id` field, if present in `body`, is not sent.
    pub async fn patch<T, B>(&self, entity: &str, id: &str, body: &B) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.item_url(entity, id)?;
        let body = without_id(to_json_body(body)?);
        self.request_data(Method::PATCH, url, Some(body)).await
    }

    /// `DELETE /{entity}/{id}`. The response body is ignored.
    pub async fn delete(&self, entity: &str, id: &str) -> Result<(), CoreError> {
        let url = self.item_url(entity, id)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    // ── Entity bindings ─────────────────────────────────────────────

    /// Bind this client to an arbitrary collection.
    pub fn entity<T>(&self, name: impl Into<String>) -> EntityClient<T> {
        EntityClient {
            client: self.clone(),
            entity: name.into(),
            _marker: PhantomData,
        }
    }

    /// `/expenses` binding.
    pub fn expenses(&self) -> EntityClient<Expense> {
        self.entity(EXPENSES_ENTITY)
    }

    /// `/categories` binding.
    pub fn categories(&self) -> EntityClient<Category> {
        self.entity(CATEGORIES_ENTITY)
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn to_json_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(body)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize request body: {e}")))
}

fn without_id(mut body: serde_json::Value) -> serde_json::Value {
    if let Some(object) = body.as_object_mut() {
        object.remove("id");
    }
    body
}

/// A `RestClient` bound to one collection, usable through `EntityApi<T>`.
pub struct EntityClient<T> {
    client: RestClient,
    entity: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EntityClient<T> {
    #[must_use]
    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

impl<T> Clone for EntityClient<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            entity: self.entity.clone(),
            _marker: PhantomData,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T> EntityApi<T> for EntityClient<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn entity(&self) -> &str {
        &self.entity
    }

    async fn get_all(&self, params: &QueryParams) -> Result<PaginatedResponse<T>, CoreError> {
        self.client.get_all(&self.entity, params).await
    }

    async fn get_by_id(&self, id: &str) -> Result<T, CoreError> {
        self.client.get_by_id(&self.entity, id).await
    }

    async fn save_new(&self, item: &T) -> Result<T, CoreError> {
        self.client.save_new(&self.entity, item).await
    }

    async fn update(&self, id: &str, item: &T) -> Result<T, CoreError> {
        self.client.update(&self.entity, id, item).await
    }

    async fn patch(&self, id: &str, changes: &serde_json::Value) -> Result<T, CoreError> {
        self.client.patch(&self.entity, id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.client.delete(&self.entity, id).await
    }
}
