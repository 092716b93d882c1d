use std::sync::Arc;

use crate::domain::entities::{
    ClinicalRecordFilter, ConsultationKind, CreateReferralRequest, Department, Patient, Referral,
    ReferralDetails,
};
use crate::domain::errors::{DomainError, FieldError};
use crate::domain::ports::{ConsultationRepository, CrudRepository, ReferralRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::pagination::{PageRequest, Paged};

#[derive(Clone)]
pub struct ReferralService {
    referral_repo: Arc<dyn ReferralRepository>,
    patient_repo: Arc<dyn CrudRepository<Patient>>,
    department_repo: Arc<dyn CrudRepository<Department>>,
    consultation_repo: Arc<dyn ConsultationRepository>,
}

impl ReferralService {
    pub fn new(
        referral_repo: Arc<dyn ReferralRepository>,
        patient_repo: Arc<dyn CrudRepository<Patient>>,
        department_repo: Arc<dyn CrudRepository<Department>>,
        consultation_repo: Arc<dyn ConsultationRepository>,
    ) -> Self {
        Self {
            referral_repo,
            patient_repo,
            department_repo,
            consultation_repo,
        }
    }

    pub async fn create(&self, request: CreateReferralRequest) -> ApiResult<ReferralDetails> {
        request.validate()?;

        let mut missing = Vec::new();
        if !self.patient_repo.exists(&request.patient_id).await? {
            missing.push(FieldError::new("patient_id", "Patient does not exist"));
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

        let referral = Referral::new(request);
        self.referral_repo.insert(&referral).await?;
        tracing::info!(
            "Patient {} referred from {} to {}",
            referral.patient_id,
            referral.external_post,
            referral.destination_department_id
        );

        self.get(&referral.id).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<ReferralDetails> {
        self.referral_repo
            .find_details(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Referral {} not found", id)))
    }

    pub async fn list(
        &self,
        filter: ClinicalRecordFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<ReferralDetails>> {
        let (items, total) = self
            .referral_repo
            .list_details(filter.patient_id.as_deref(), page)
            .await?;
        Ok(Paged::new(items, page, total))
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.get(id).await?;

        let kind = ConsultationKind::Referral.to_string();
        if self.consultation_repo.count_for_source(&kind, id).await? > 0 {
            return Err(ApiError::Conflict(
                "Referral has consultations and cannot be deleted".to_string(),
            ));
        }

        self.referral_repo.delete(id).await?;
        Ok(())
    }
}
