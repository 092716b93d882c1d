use std::sync::Arc;

use crate::domain::entities::{
    AppointHeadRequest, Department, DepartmentHead, DepartmentHeadDetails, DepartmentRequest,
    DepartmentResponse, DoctorResponse,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CrudRepository, DepartmentRepository, DoctorRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::pagination::{PageRequest, Paged};
use crate::shared::timestamps::now_rfc3339;

#[derive(Clone)]
pub struct DepartmentService {
    department_repo: Arc<dyn DepartmentRepository>,
    doctor_repo: Arc<dyn DoctorRepository>,
}

impl DepartmentService {
    pub fn new(
        department_repo: Arc<dyn DepartmentRepository>,
        doctor_repo: Arc<dyn DoctorRepository>,
    ) -> Self {
        Self {
            department_repo,
            doctor_repo,
        }
    }

    pub async fn create(&self, request: DepartmentRequest) -> ApiResult<DepartmentResponse> {
        request.validate()?;
        self.ensure_name_available(&request.name, None).await?;

        let department = Department::new(request.name.trim().to_string(), request.description);
        self.department_repo.insert(&department).await?;

        tracing::info!("Created department {} ({})", department.name, department.id);
        Ok(department.into())
    }

    pub async fn get(&self, id: &str) -> ApiResult<DepartmentResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Paged<DepartmentResponse>> {
        let departments = self.department_repo.list(page).await?;
        let total = self.department_repo.count().await?;
        Ok(Paged::new(departments, page, total).map(DepartmentResponse::from))
    }

    pub async fn update(
        &self,
        id: &str,
        request: DepartmentRequest,
    ) -> ApiResult<DepartmentResponse> {
        request.validate()?;
        let mut department = self.find(id).await?;
        self.ensure_name_available(&request.name, Some(id)).await?;

        department.name = request.name.trim().to_string();
        department.description = request.description;
        department.updated_at = now_rfc3339();
        self.department_repo.update(&department).await?;

        Ok(department.into())
    }

    /// Fails with Conflict while doctors, stock or clinical records reference it.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.find(id).await?;
        self.department_repo.delete(id).await.map_err(|e| match e {
            ApiError::Conflict(_) => ApiError::Conflict(
                "Department is still referenced by doctors, stock or clinical records".to_string(),
            ),
            other => other,
        })?;
        tracing::info!("Deleted department {}", id);
        Ok(())
    }

    pub async fn list_doctors(&self, department_id: &str) -> ApiResult<Vec<DoctorResponse>> {
        self.find(department_id).await?;
        let doctors = self.doctor_repo.list_by_department(department_id).await?;
        Ok(doctors.into_iter().map(DoctorResponse::from).collect())
    }

    // Department heads

    /// Appoints the doctor as head, replacing any current head.
    pub async fn appoint_head(
        &self,
        department_id: &str,
        request: AppointHeadRequest,
    ) -> ApiResult<DepartmentHeadDetails> {
        self.find(department_id).await?;

        let doctor = self
            .doctor_repo
            .find_by_id(&request.doctor_id)
            .await?
            .ok_or_else(|| {
                DomainError::invalid(
                    "doctor_id",
                    format!("Doctor {} does not exist", request.doctor_id),
                )
            })?;
        if doctor.department_id != department_id {
            return Err(DomainError::invalid(
                "doctor_id",
                "Doctor must belong to the department being headed",
            )
            .into());
        }

        let head = DepartmentHead::new(doctor.id, department_id.to_string());
        self.department_repo.replace_head(&head).await?;
        tracing::info!("Appointed doctor {} as head of {}", head.doctor_id, department_id);

        self.get_head(department_id).await
    }

    pub async fn get_head(&self, department_id: &str) -> ApiResult<DepartmentHeadDetails> {
        self.department_repo
            .find_head(department_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Department {} has no head", department_id))
            })
    }

    pub async fn list_heads(&self) -> ApiResult<Vec<DepartmentHeadDetails>> {
        self.department_repo.list_heads().await
    }

    pub async fn remove_head(&self, department_id: &str) -> ApiResult<()> {
        if !self.department_repo.remove_head(department_id).await? {
            return Err(ApiError::NotFound(format!(
                "Department {} has no head",
                department_id
            )));
        }
        Ok(())
    }

    async fn find(&self, id: &str) -> ApiResult<Department> {
        self.department_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Department {} not found", id)))
    }

    async fn ensure_name_available(&self, name: &str, current_id: Option<&str>) -> ApiResult<()> {
        match self.department_repo.find_by_name(name).await? {
            Some(existing) if Some(existing.id.as_str()) != current_id => Err(ApiError::Conflict(
                "A department with this name already exists".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
