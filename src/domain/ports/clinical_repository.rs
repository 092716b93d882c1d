use crate::domain::entities::{
    Consultation, ConsultationDetails, Derivation, DerivationDetails, Prescription, Referral,
    ReferralDetails,
};
use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;

#[async_trait]
pub trait DerivationRepository: CrudRepository<Derivation> {
    async fn find_details(&self, id: &str) -> ApiResult<Option<DerivationDetails>>;
    async fn list_details(
        &self,
        patient_id: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<DerivationDetails>, i64)>;
    async fn list_for_patient(&self, patient_id: &str) -> ApiResult<Vec<DerivationDetails>>;
}

#[async_trait]
pub trait ReferralRepository: CrudRepository<Referral> {
    async fn find_details(&self, id: &str) -> ApiResult<Option<ReferralDetails>>;
    async fn list_details(
        &self,
        patient_id: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<ReferralDetails>, i64)>;
    async fn list_for_patient(&self, patient_id: &str) -> ApiResult<Vec<ReferralDetails>>;
}

#[derive(Debug, Default, Clone)]
pub struct ConsultationQuery {
    pub kind: Option<String>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

#[async_trait]
pub trait ConsultationRepository: CrudRepository<Consultation> {
    /// Inserts the consultation and its prescriptions, dispensing each
    /// prescription from the department stock, in one transaction.
    /// Returns the medication id that lacked stock, if any; nothing is
    /// persisted in that case.
    async fn create_with_prescriptions(
        &self,
        consultation: &Consultation,
        prescriptions: &[Prescription],
    ) -> ApiResult<Option<String>>;
    async fn find_details(&self, id: &str) -> ApiResult<Option<ConsultationDetails>>;
    async fn list_details(
        &self,
        query: &ConsultationQuery,
        page: PageRequest,
    ) -> ApiResult<(Vec<ConsultationDetails>, i64)>;
    async fn list_for_patient(&self, patient_id: &str) -> ApiResult<Vec<ConsultationDetails>>;
    async fn count_for_source(&self, kind: &str, source_id: &str) -> ApiResult<i64>;
}
