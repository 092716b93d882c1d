use std::sync::Arc;

use crate::domain::entities::{
    ClinicalRecordFilter, ConsultationKind, CreateDerivationRequest, Department, Derivation,
    DerivationDetails, Patient,
};
use crate::domain::errors::{DomainError, FieldError};
use crate::domain::ports::{ConsultationRepository, CrudRepository, DerivationRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::pagination::{PageRequest, Paged};

#[derive(Clone)]
pub struct DerivationService {
    derivation_repo: Arc<dyn DerivationRepository>,
    patient_repo: Arc<dyn CrudRepository<Patient>>,
    department_repo: Arc<dyn CrudRepository<Department>>,
    consultation_repo: Arc<dyn ConsultationRepository>,
}

impl DerivationService {
    pub fn new(
        derivation_repo: Arc<dyn DerivationRepository>,
        patient_repo: Arc<dyn CrudRepository<Patient>>,
        department_repo: Arc<dyn CrudRepository<Department>>,
        consultation_repo: Arc<dyn ConsultationRepository>,
    ) -> Self {
        Self {
            derivation_repo,
            patient_repo,
            department_repo,
            consultation_repo,
        }
    }

    pub async fn create(&self, request: CreateDerivationRequest) -> ApiResult<DerivationDetails> {
        request.validate()?;

        let mut missing = Vec::new();
        if !self.patient_repo.exists(&request.patient_id).await? {
            missing.push(FieldError::new("patient_id", "Patient does not exist"));
        }
        if !self.department_repo.exists(&request.origin_department_id).await? {
            missing.push(FieldError::new(
                "origin_department_id",
                "Department does not exist",
            ));
        }
        if !self
            .department_repo
            .exists(&request.destination_department_id)
            .await?
        {
            missing.push(FieldError::new(
                "destination_department_id",
                "Department does not exist",
            ));
        }
        if !missing.is_empty() {
            return Err(DomainError::Validation(missing).into());
        }

        let derivation = Derivation::new(request);
        self.derivation_repo.insert(&derivation).await?;
        tracing::info!(
            "Patient {} derived from {} to {}",
            derivation.patient_id,
            derivation.origin_department_id,
            derivation.destination_department_id
        );

        self.get(&derivation.id).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<DerivationDetails> {
        self.derivation_repo
            .find_details(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Derivation {} not found", id)))
    }

    pub async fn list(
        &self,
        filter: ClinicalRecordFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<DerivationDetails>> {
        let (items, total) = self
            .derivation_repo
            .list_details(filter.patient_id.as_deref(), page)
            .await?;
        Ok(Paged::new(items, page, total))
    }

    /// A derivation with consultations attached cannot be deleted.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.get(id).await?;

        let kind = ConsultationKind::Derivation.to_string();
        if self.consultation_repo.count_for_source(&kind, id).await? > 0 {
            return Err(ApiError::Conflict(
                "Derivation has consultations and cannot be deleted".to_string(),
            ));
        }

        self.derivation_repo.delete(id).await?;
        Ok(())
    }
}
