use crate::domain::entities::{Medication, StockDepartment, StockDetails};
use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;

#[async_trait]
pub trait MedicationRepository: CrudRepository<Medication> {
    async fn search(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<Medication>, i64)>;
    async fn find_by_name_and_batch(
        &self,
        name: &str,
        batch_number: &str,
    ) -> ApiResult<Option<Medication>>;
    /// Expiration date strictly before `date` (`YYYY-MM-DD`), soonest first.
    async fn list_expiring_before(&self, date: &str) -> ApiResult<Vec<Medication>>;
    async fn list_below_minimum(&self) -> ApiResult<Vec<Medication>>;
}

#[async_trait]
pub trait StockRepository: CrudRepository<StockDepartment> {
    async fn find_for(
        &self,
        department_id: &str,
        medication_id: &str,
    ) -> ApiResult<Option<StockDepartment>>;
    async fn list_by_department(&self, department_id: &str) -> ApiResult<Vec<StockDetails>>;
    /// Applies a signed delta; `None` when the result would go below zero.
    async fn adjust_quantity(&self, id: &str, delta: i64) -> ApiResult<Option<StockDepartment>>;
}
