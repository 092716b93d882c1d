use crate::domain::entities::Patient;
use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;

#[async_trait]
pub trait PatientRepository: CrudRepository<Patient> {
    async fn find_by_identification_number(&self, number: &str) -> ApiResult<Option<Patient>>;
    /// Case-insensitive substring search on name; `None` lists everyone.
    async fn search(&self, name: Option<&str>, page: PageRequest)
        -> ApiResult<(Vec<Patient>, i64)>;
}
