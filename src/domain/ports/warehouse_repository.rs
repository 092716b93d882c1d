use crate::domain::entities::{RequestStatus, WarehouseRequest, WarehouseRequestDetails};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;

/// Why an approval could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    NotPending(RequestStatus),
    InsufficientWarehouseStock { medication_id: String },
}

#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    async fn create_request(&self, request: &WarehouseRequest) -> ApiResult<()>;
    async fn find_request(&self, id: &str) -> ApiResult<Option<WarehouseRequest>>;
    async fn find_details(&self, id: &str) -> ApiResult<Option<WarehouseRequestDetails>>;
    async fn list_details(
        &self,
        department_id: Option<&str>,
        status: Option<RequestStatus>,
        page: PageRequest,
    ) -> ApiResult<(Vec<WarehouseRequestDetails>, i64)>;
    /// Moves the requested quantities from the warehouse into the
    /// department's stock and marks the request approved, atomically.
    async fn approve_request(&self, id: &str, resolved_at: &str) -> ApiResult<ApprovalOutcome>;
    /// Returns false when the request was not pending.
    async fn reject_request(
        &self,
        id: &str,
        resolved_at: &str,
        notes: Option<&str>,
    ) -> ApiResult<bool>;
    /// Returns false when the request was not pending.
    async fn delete_pending_request(&self, id: &str) -> ApiResult<bool>;
}
