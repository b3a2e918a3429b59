use async_trait::async_trait;

use crate::errors::CoreError;

use super::response::PaginatedResponse;

/// Query parameters appended to a collection request, in order.
pub type QueryParams = [(String, String)];

/// CRUD operations on one remote entity collection (e.g. `/expenses`).
///
/// `ExpenseTracker` depends only on this trait, so the HTTP implementation
/// (`EntityClient`) can be swapped for an in-memory one in tests.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait EntityApi<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Path segment of the collection, without slashes (for logs/errors).
    fn entity(&self) -> &str;

    /// `GET /{entity}`
    async fn get_all(&self, params: &QueryParams) -> Result<PaginatedResponse<T>, CoreError>;

    /// `GET /{entity}/{id}`
    async fn get_by_id(&self, id: &str) -> Result<T, CoreError>;

    /// `POST /{entity}`: returns the stored item as the server echoes it.
    async fn save_new(&self, item: &T) -> Result<T, CoreError>;

    /// `PUT /{entity}/{id}`: full replacement.
    async fn update(&self, id: &str, item: &T) -> Result<T, CoreError>;

    /// `PATCH /{entity}/{id}`: only the fields present in `changes`.
    async fn patch(&self, id: &str, changes: &serde_json::Value) -> Result<T, CoreError>;

    /// `DELETE /{entity}/{id}`
    async fn delete(&self, id: &str) -> Result<(), CoreError>;
}
