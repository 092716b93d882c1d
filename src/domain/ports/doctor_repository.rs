use crate::domain::entities::Doctor;
use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;

#[async_trait]
pub trait DoctorRepository: CrudRepository<Doctor> {
    async fn find_by_license_number(&self, license_number: &str) -> ApiResult<Option<Doctor>>;
    async fn list_by_department(&self, department_id: &str) -> ApiResult<Vec<Doctor>>;
    async fn list_filtered(
        &self,
        department_id: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<Doctor>, i64)>;
}
