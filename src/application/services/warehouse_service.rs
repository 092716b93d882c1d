use std::sync::Arc;

use crate::domain::entities::{
    CreateWarehouseRequest, Department, Medication, RequestStatus, ResolveRequest,
    WarehouseRequest, WarehouseRequestDetails, WarehouseRequestFilter,
};
use crate::domain::errors::{DomainError, FieldError};
use crate::domain::ports::{ApprovalOutcome, CrudRepository, WarehouseRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::observability::metrics;
use crate::shared::pagination::{PageRequest, Paged};
use crate::shared::timestamps::now_rfc3339;

/// Replenishment requests from departments to the central warehouse.
#[derive(Clone)]
pub struct WarehouseService {
    warehouse_repo: Arc<dyn WarehouseRepository>,
    department_repo: Arc<dyn CrudRepository<Department>>,
    medication_repo: Arc<dyn CrudRepository<Medication>>,
}

impl WarehouseService {
    pub fn new(
        warehouse_repo: Arc<dyn WarehouseRepository>,
        department_repo: Arc<dyn CrudRepository<Department>>,
        medication_repo: Arc<dyn CrudRepository<Medication>>,
    ) -> Self {
        Self {
            warehouse_repo,
            department_repo,
            medication_repo,
        }
    }

    pub async fn create(
        &self,
        request: CreateWarehouseRequest,
    ) -> ApiResult<WarehouseRequestDetails> {
        request.validate()?;

        let mut errors = Vec::new();
        if !self.department_repo.exists(&request.department_id).await? {
            errors.push(FieldError::new("department_id", "Department does not exist"));
        }
        for (i, item) in request.items.iter().enumerate() {
            if !self.medication_repo.exists(&item.medication_id).await? {
                errors.push(FieldError::new(
                    format!("items[{}]", i),
                    "Medication does not exist",
                ));
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors).into());
        }

        let warehouse_request = WarehouseRequest::new(request);
        self.warehouse_repo.create_request(&warehouse_request).await?;
        metrics::record_warehouse_request(RequestStatus::Pending);
        tracing::info!(
            "Department {} requested {} medications ({})",
            warehouse_request.department_id,
            warehouse_request.items.len(),
            warehouse_request.id
        );

        self.get(&warehouse_request.id).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<WarehouseRequestDetails> {
        self.warehouse_repo
            .find_details(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Warehouse request {} not found", id)))
    }

    pub async fn list(
        &self,
        filter: WarehouseRequestFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<WarehouseRequestDetails>> {
        let status = filter
            .status
            .as_deref()
            .map(|s| s.parse::<RequestStatus>())
            .transpose()
            .map_err(|e| DomainError::invalid("status", e))?;

        let (items, total) = self
            .warehouse_repo
            .list_details(filter.department_id.as_deref(), status, page)
            .await?;
        Ok(Paged::new(items, page, total))
    }

    /// Moves the requested quantities from the warehouse into department stock.
    pub async fn approve(&self, id: &str) -> ApiResult<WarehouseRequestDetails> {
        self.ensure_exists(id).await?;

        match self.warehouse_repo.approve_request(id, &now_rfc3339()).await? {
            ApprovalOutcome::Approved => {
                metrics::record_warehouse_request(RequestStatus::Approved);
                tracing::info!("Warehouse request {} approved", id);
                self.get(id).await
            }
            ApprovalOutcome::NotPending(status) => Err(ApiError::Conflict(format!(
                "Warehouse request is already {}",
                status
            ))),
            ApprovalOutcome::InsufficientWarehouseStock { medication_id } => {
                Err(ApiError::Conflict(format!(
                    "Insufficient warehouse stock of medication {}",
                    medication_id
                )))
            }
        }
    }

    pub async fn reject(
        &self,
        id: &str,
        request: ResolveRequest,
    ) -> ApiResult<WarehouseRequestDetails> {
        let existing = self.ensure_exists(id).await?;

        let notes = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if !self
            .warehouse_repo
            .reject_request(id, &now_rfc3339(), notes)
            .await?
        {
            return Err(ApiError::Conflict(format!(
                "Warehouse request is already {}",
                existing.status
            )));
        }

        metrics::record_warehouse_request(RequestStatus::Rejected);
        tracing::info!("Warehouse request {} rejected", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let existing = self.ensure_exists(id).await?;

        if !self.warehouse_repo.delete_pending_request(id).await? {
            return Err(ApiError::Conflict(format!(
                "Only pending requests can be deleted; this one is {}",
                existing.status
            )));
        }
        Ok(())
    }

    async fn ensure_exists(&self, id: &str) -> ApiResult<WarehouseRequest> {
        self.warehouse_repo
            .find_request(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Warehouse request {} not found", id)))
    }
}
