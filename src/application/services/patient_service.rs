use std::sync::Arc;

use crate::domain::entities::{
    ClinicalHistoryResponse, Patient, PatientFilter, PatientRequest, PatientResponse,
};
use crate::domain::ports::{
    ConsultationRepository, CrudRepository, DerivationRepository, PatientRepository,
    ReferralRepository,
};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::pagination::{PageRequest, Paged};

#[derive(Clone)]
pub struct PatientService {
    patient_repo: Arc<dyn PatientRepository>,
    derivation_repo: Arc<dyn DerivationRepository>,
    referral_repo: Arc<dyn ReferralRepository>,
    consultation_repo: Arc<dyn ConsultationRepository>,
}

impl PatientService {
    pub fn new(
        patient_repo: Arc<dyn PatientRepository>,
        derivation_repo: Arc<dyn DerivationRepository>,
        referral_repo: Arc<dyn ReferralRepository>,
        consultation_repo: Arc<dyn ConsultationRepository>,
    ) -> Self {
        Self {
            patient_repo,
            derivation_repo,
            referral_repo,
            consultation_repo,
        }
    }

    pub async fn create(&self, request: PatientRequest) -> ApiResult<PatientResponse> {
        request.validate()?;
        self.ensure_identification_available(&request.identification_number, None)
            .await?;

        let patient = Patient::new(request);
        self.patient_repo.insert(&patient).await?;

        tracing::info!("Registered patient {}", patient.id);
        Ok(patient.into())
    }

    pub async fn get(&self, id: &str) -> ApiResult<PatientResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn list(
        &self,
        filter: PatientFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<PatientResponse>> {
        let (patients, total) = self.patient_repo.search(filter.q.as_deref(), page).await?;
        Ok(Paged::new(patients, page, total).map(PatientResponse::from))
    }

    pub async fn find_by_identification_number(&self, number: &str) -> ApiResult<PatientResponse> {
        self.patient_repo
            .find_by_identification_number(number)
            .await?
            .map(PatientResponse::from)
            .ok_or_else(|| {
                ApiError::NotFound(format!("No patient with identification {}", number))
            })
    }

    pub async fn update(&self, id: &str, request: PatientRequest) -> ApiResult<PatientResponse> {
        request.validate()?;
        let existing = self.find(id).await?;
        self.ensure_identification_available(&request.identification_number, Some(id))
            .await?;

        let patient = request.into_patient(existing.id, existing.created_at);
        self.patient_repo.update(&patient).await?;
        Ok(patient.into())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.find(id).await?;
        self.patient_repo.delete(id).await.map_err(|e| match e {
            ApiError::Conflict(_) => ApiError::Conflict(
                "Patient has derivations, referrals or consultations on record".to_string(),
            ),
            other => other,
        })?;
        Ok(())
    }

    pub async fn history(&self, id: &str) -> ApiResult<ClinicalHistoryResponse> {
        let patient = self.find(id).await?;

        let derivations = self.derivation_repo.list_for_patient(id).await?;
        let referrals = self.referral_repo.list_for_patient(id).await?;
        let consultations = self.consultation_repo.list_for_patient(id).await?;

        Ok(ClinicalHistoryResponse {
            patient: patient.into(),
            derivations,
            referrals,
            consultations,
        })
    }

    async fn find(&self, id: &str) -> ApiResult<Patient> {
        self.patient_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Patient {} not found", id)))
    }

    async fn ensure_identification_available(
        &self,
        number: &str,
        current_id: Option<&str>,
    ) -> ApiResult<()> {
        match self.patient_repo.find_by_identification_number(number).await? {
            Some(existing) if Some(existing.id.as_str()) != current_id => Err(ApiError::Conflict(
                "A patient with this identification number already exists".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
