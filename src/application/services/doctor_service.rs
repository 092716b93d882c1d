use std::sync::Arc;

use crate::domain::entities::{Department, Doctor, DoctorFilter, DoctorRequest, DoctorResponse};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CrudRepository, DoctorRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::pagination::{PageRequest, Paged};
use crate::shared::timestamps::now_rfc3339;

#[derive(Clone)]
pub struct DoctorService {
    doctor_repo: Arc<dyn DoctorRepository>,
    department_repo: Arc<dyn CrudRepository<Department>>,
}

impl DoctorService {
    pub fn new(
        doctor_repo: Arc<dyn DoctorRepository>,
        department_repo: Arc<dyn CrudRepository<Department>>,
    ) -> Self {
        Self {
            doctor_repo,
            department_repo,
        }
    }

    pub async fn create(&self, request: DoctorRequest) -> ApiResult<DoctorResponse> {
        request.validate()?;
        self.ensure_department_exists(&request.department_id).await?;
        self.ensure_license_available(&request.license_number, None).await?;

        let doctor = Doctor::new(request);
        self.doctor_repo.insert(&doctor).await?;

        tracing::info!("Registered doctor {} ({})", doctor.name, doctor.id);
        Ok(doctor.into())
    }

    pub async fn get(&self, id: &str) -> ApiResult<DoctorResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn list(
        &self,
        filter: DoctorFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<DoctorResponse>> {
        let (doctors, total) = self
            .doctor_repo
            .list_filtered(filter.department_id.as_deref(), page)
            .await?;
        Ok(Paged::new(doctors, page, total).map(DoctorResponse::from))
    }

    pub async fn find_by_license_number(&self, license_number: &str) -> ApiResult<DoctorResponse> {
        self.doctor_repo
            .find_by_license_number(license_number.trim())
            .await?
            .map(DoctorResponse::from)
            .ok_or_else(|| {
                ApiError::NotFound(format!("No doctor with license {}", license_number))
            })
    }

    pub async fn update(&self, id: &str, request: DoctorRequest) -> ApiResult<DoctorResponse> {
        request.validate()?;
        let existing = self.find(id).await?;
        self.ensure_department_exists(&request.department_id).await?;
        self.ensure_license_available(&request.license_number, Some(id))
            .await?;

        let doctor = Doctor {
            id: existing.id,
            created_at: existing.created_at,
            updated_at: now_rfc3339(),
            ..Doctor::new(request)
        };
        self.doctor_repo.update(&doctor).await?;

        Ok(doctor.into())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.find(id).await?;
        self.doctor_repo.delete(id).await.map_err(|e| match e {
            ApiError::Conflict(_) => {
                ApiError::Conflict("Doctor still has recorded consultations".to_string())
            }
            other => other,
        })?;
        Ok(())
    }

    async fn find(&self, id: &str) -> ApiResult<Doctor> {
        self.doctor_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Doctor {} not found", id)))
    }

    async fn ensure_department_exists(&self, department_id: &str) -> ApiResult<()> {
        if self.department_repo.exists(department_id).await? {
            Ok(())
        } else {
            Err(DomainError::invalid(
                "department_id",
                format!("Department {} does not exist", department_id),
            )
            .into())
        }
    }

    async fn ensure_license_available(
        &self,
        license_number: &str,
        current_id: Option<&str>,
    ) -> ApiResult<()> {
        match self
            .doctor_repo
            .find_by_license_number(license_number.trim())
            .await?
        {
            Some(existing) if Some(existing.id.as_str()) != current_id => Err(ApiError::Conflict(
                "A doctor with this license number already exists".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
