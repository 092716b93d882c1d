use std::sync::Arc;

use crate::domain::entities::{
    Consultation, ConsultationDetails, ConsultationFilter, ConsultationKind, ConsultationOutcome,
    CreateConsultationRequest, Derivation, Doctor, Medication, Referral,
};
use crate::domain::errors::{DomainError, FieldError};
use crate::domain::ports::{ConsultationQuery, ConsultationRepository, CrudRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::observability::metrics;
use crate::shared::pagination::{PageRequest, Paged};
use crate::shared::timestamps::parse_date;

/// The record a consultation answers: who was sent, where, and when.
struct ConsultationSource {
    patient_id: String,
    destination_department_id: String,
    date: String,
}

#[derive(Clone)]
pub struct ConsultationService {
    consultation_repo: Arc<dyn ConsultationRepository>,
    derivation_repo: Arc<dyn CrudRepository<Derivation>>,
    referral_repo: Arc<dyn CrudRepository<Referral>>,
    doctor_repo: Arc<dyn CrudRepository<Doctor>>,
    medication_repo: Arc<dyn CrudRepository<Medication>>,
}

impl ConsultationService {
    pub fn new(
        consultation_repo: Arc<dyn ConsultationRepository>,
        derivation_repo: Arc<dyn CrudRepository<Derivation>>,
        referral_repo: Arc<dyn CrudRepository<Referral>>,
        doctor_repo: Arc<dyn CrudRepository<Doctor>>,
        medication_repo: Arc<dyn CrudRepository<Medication>>,
    ) -> Self {
        Self {
            consultation_repo,
            derivation_repo,
            referral_repo,
            doctor_repo,
            medication_repo,
        }
    }

    /// Records the consultation and dispenses its prescriptions from the
    /// department stock; nothing is stored when any stock is short.
    pub async fn create(
        &self,
        request: CreateConsultationRequest,
    ) -> ApiResult<ConsultationDetails> {
        request.validate()?;
        let kind: ConsultationKind = request
            .kind
            .parse()
            .map_err(|e: String| DomainError::invalid("kind", e))?;
        let outcome: ConsultationOutcome = request
            .outcome
            .parse()
            .map_err(|e: String| DomainError::invalid("outcome", e))?;

        let source = self
            .load_source(kind, &request.source_id)
            .await?
            .ok_or_else(|| {
                let message = format!("{} {} does not exist", kind, request.source_id);
                DomainError::invalid("source_id", message)
            })?;

        let mut errors = Vec::new();
        match self.doctor_repo.find_by_id(&request.doctor_id).await? {
            None => errors.push(FieldError::new("doctor_id", "Doctor does not exist")),
            Some(doctor) if doctor.department_id != request.department_id => errors.push(
                FieldError::new("doctor_id", "Doctor does not belong to the department"),
            ),
            Some(_) => {}
        }
        if source.destination_department_id != request.department_id {
            errors.push(FieldError::new(
                "department_id",
                format!("Department must match the {} destination", kind),
            ));
        }
        if let (Some(date), Some(source_date)) = (
            parse_date(&request.consultation_date),
            parse_date(&source.date),
        ) {
            if date < source_date {
                errors.push(FieldError::new(
                    "consultation_date",
                    format!("Consultation cannot precede the {} date {}", kind, source.date),
                ));
            }
        }
        for (i, prescription) in request.prescriptions.iter().enumerate() {
            if !self.medication_repo.exists(&prescription.medication_id).await? {
                errors.push(FieldError::new(
                    format!("prescriptions[{}]", i),
                    "Medication does not exist",
                ));
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors).into());
        }

        let consultation = Consultation::new(&request, kind, outcome, source.patient_id);
        let prescriptions = consultation.prescriptions(&request.prescriptions);

        if let Some(medication_id) = self
            .consultation_repo
            .create_with_prescriptions(&consultation, &prescriptions)
            .await?
        {
            return Err(ApiError::Conflict(format!(
                "Insufficient stock of medication {} in department {}",
                medication_id, consultation.department_id
            )));
        }

        metrics::record_consultation_created(kind);
        tracing::info!(
            "Consultation {} recorded by doctor {} ({} prescriptions)",
            consultation.id,
            consultation.doctor_id,
            prescriptions.len()
        );

        self.get(&consultation.id).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<ConsultationDetails> {
        self.consultation_repo
            .find_details(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Consultation {} not found", id)))
    }

    pub async fn list(
        &self,
        filter: ConsultationFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<ConsultationDetails>> {
        let kind = filter
            .kind
            .as_deref()
            .map(|k| k.parse::<ConsultationKind>())
            .transpose()
            .map_err(|e| DomainError::invalid("kind", e))?;

        let query = ConsultationQuery {
            kind: kind.map(|k| k.to_string()),
            doctor_id: filter.doctor_id,
            patient_id: filter.patient_id,
        };
        let (items, total) = self.consultation_repo.list_details(&query, page).await?;
        Ok(Paged::new(items, page, total))
    }

    /// Dispensed medication is not returned to stock.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        if !self.consultation_repo.delete(id).await? {
            return Err(ApiError::NotFound(format!("Consultation {} not found", id)));
        }
        Ok(())
    }

    async fn load_source(
        &self,
        kind: ConsultationKind,
        source_id: &str,
    ) -> ApiResult<Option<ConsultationSource>> {
        let source = match kind {
            ConsultationKind::Derivation => {
                self.derivation_repo
                    .find_by_id(source_id)
                    .await?
                    .map(|d| ConsultationSource {
                        patient_id: d.patient_id,
                        destination_department_id: d.destination_department_id,
                        date: d.derivation_date,
                    })
            }
            ConsultationKind::Referral => {
                self.referral_repo
                    .find_by_id(source_id)
                    .await?
                    .map(|r| ConsultationSource {
                        patient_id: r.patient_id,
                        destination_department_id: r.destination_department_id,
                        date: r.referral_date,
                    })
            }
        };
        Ok(source)
    }
}
