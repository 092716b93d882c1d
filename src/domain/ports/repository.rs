use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;

/// Generic persistence operations shared by every flat entity table.
///
/// Per-entity repositories extend this with their filtered queries.
#[async_trait]
pub trait CrudRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<T>>;
    async fn list(&self, page: PageRequest) -> ApiResult<Vec<T>>;
    async fn count(&self) -> ApiResult<i64>;
    async fn exists(&self, id: &str) -> ApiResult<bool>;
    async fn insert(&self, entity: &T) -> ApiResult<()>;
    /// Returns false when no row has the entity's id.
    async fn update(&self, entity: &T) -> ApiResult<bool>;
    /// Returns false when no row had `id`.
    async fn delete(&self, id: &str) -> ApiResult<bool>;
}
