use crate::domain::entities::{Department, DepartmentHead, DepartmentHeadDetails};
use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait DepartmentRepository: CrudRepository<Department> {
    async fn find_by_name(&self, name: &str) -> ApiResult<Option<Department>>;

    // Department heads
    async fn find_head(&self, department_id: &str) -> ApiResult<Option<DepartmentHeadDetails>>;
    async fn list_heads(&self) -> ApiResult<Vec<DepartmentHeadDetails>>;
    /// Removes any current head of the department and inserts `head` atomically.
    async fn replace_head(&self, head: &DepartmentHead) -> ApiResult<()>;
    async fn remove_head(&self, department_id: &str) -> ApiResult<bool>;
}
