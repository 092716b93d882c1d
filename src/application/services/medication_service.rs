use std::sync::Arc;

use crate::domain::entities::{
    AdjustStockRequest, Department, Medication, MedicationFilter, MedicationRequest,
    MedicationResponse, StockDepartment, StockDetails, UpsertStockRequest,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CrudRepository, MedicationRepository, StockRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::pagination::{PageRequest, Paged};
use crate::shared::timestamps::{format_date, now_rfc3339, parse_date};

/// Warehouse medications and per-department stock.
#[derive(Clone)]
pub struct MedicationService {
    medication_repo: Arc<dyn MedicationRepository>,
    stock_repo: Arc<dyn StockRepository>,
    department_repo: Arc<dyn CrudRepository<Department>>,
}

impl MedicationService {
    pub fn new(
        medication_repo: Arc<dyn MedicationRepository>,
        stock_repo: Arc<dyn StockRepository>,
        department_repo: Arc<dyn CrudRepository<Department>>,
    ) -> Self {
        Self {
            medication_repo,
            stock_repo,
            department_repo,
        }
    }

    pub async fn create(&self, request: MedicationRequest) -> ApiResult<MedicationResponse> {
        request.validate()?;
        self.ensure_batch_available(&request, None).await?;

        let medication = Medication::new(request);
        self.medication_repo.insert(&medication).await?;

        tracing::info!(
            "Registered medication {} batch {} ({})",
            medication.name,
            medication.batch_number,
            medication.id
        );
        Ok(medication.into())
    }

    pub async fn get(&self, id: &str) -> ApiResult<MedicationResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn list(
        &self,
        filter: MedicationFilter,
        page: PageRequest,
    ) -> ApiResult<Paged<MedicationResponse>> {
        let (medications, total) = self.medication_repo.search(filter.q.as_deref(), page).await?;
        Ok(Paged::new(medications, page, total).map(MedicationResponse::from))
    }

    pub async fn update(
        &self,
        id: &str,
        request: MedicationRequest,
    ) -> ApiResult<MedicationResponse> {
        request.validate()?;
        let existing = self.find(id).await?;
        self.ensure_batch_available(&request, Some(id)).await?;

        let medication = request.into_medication(existing.id, existing.created_at);
        self.medication_repo.update(&medication).await?;
        Ok(medication.into())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.find(id).await?;
        self.medication_repo.delete(id).await.map_err(|e| match e {
            ApiError::Conflict(_) => ApiError::Conflict(
                "Medication is still stocked, prescribed or requested".to_string(),
            ),
            other => other,
        })?;
        Ok(())
    }

    pub async fn list_expiring_before(&self, before: &str) -> ApiResult<Vec<MedicationResponse>> {
        let date = parse_date(before)
            .ok_or_else(|| DomainError::invalid("before", "before must be a YYYY-MM-DD date"))?;
        let medications = self
            .medication_repo
            .list_expiring_before(&format_date(date))
            .await?;
        Ok(medications.into_iter().map(MedicationResponse::from).collect())
    }

    pub async fn list_below_minimum(&self) -> ApiResult<Vec<MedicationResponse>> {
        let medications = self.medication_repo.list_below_minimum().await?;
        Ok(medications.into_iter().map(MedicationResponse::from).collect())
    }

    // Department stock

    /// Creates or replaces the stock row of a medication in a department.
    pub async fn upsert_stock(
        &self,
        department_id: &str,
        request: UpsertStockRequest,
    ) -> ApiResult<StockDepartment> {
        request.validate()?;
        if !self.department_repo.exists(department_id).await? {
            return Err(ApiError::NotFound(format!(
                "Department {} not found",
                department_id
            )));
        }
        if !self.medication_repo.exists(&request.medication_id).await? {
            return Err(DomainError::invalid(
                "medication_id",
                format!("Medication {} does not exist", request.medication_id),
            )
            .into());
        }

        match self
            .stock_repo
            .find_for(department_id, &request.medication_id)
            .await?
        {
            Some(existing) => {
                let stock = StockDepartment {
                    quantity: request.quantity,
                    min_quantity: request.min_quantity,
                    max_quantity: request.max_quantity,
                    updated_at: now_rfc3339(),
                    ..existing
                };
                self.stock_repo.update(&stock).await?;
                Ok(stock)
            }
            None => {
                let stock = StockDepartment::new(department_id.to_string(), request);
                self.stock_repo.insert(&stock).await?;
                Ok(stock)
            }
        }
    }

    pub async fn get_stock(&self, id: &str) -> ApiResult<StockDepartment> {
        self.stock_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Stock entry {} not found", id)))
    }

    pub async fn list_department_stock(&self, department_id: &str) -> ApiResult<Vec<StockDetails>> {
        if !self.department_repo.exists(department_id).await? {
            return Err(ApiError::NotFound(format!(
                "Department {} not found",
                department_id
            )));
        }
        self.stock_repo.list_by_department(department_id).await
    }

    pub async fn adjust_stock(
        &self,
        id: &str,
        request: AdjustStockRequest,
    ) -> ApiResult<StockDepartment> {
        let current = self.get_stock(id).await?;

        match self.stock_repo.adjust_quantity(id, request.delta).await? {
            Some(stock) => {
                tracing::debug!(
                    "Stock {} adjusted by {} to {}",
                    id,
                    request.delta,
                    stock.quantity
                );
                Ok(stock)
            }
            None => Err(ApiError::Conflict(format!(
                "Insufficient stock: {} available, adjustment of {} requested",
                current.quantity, request.delta
            ))),
        }
    }

    pub async fn delete_stock(&self, id: &str) -> ApiResult<()> {
        if !self.stock_repo.delete(id).await? {
            return Err(ApiError::NotFound(format!("Stock entry {} not found", id)));
        }
        Ok(())
    }

    async fn find(&self, id: &str) -> ApiResult<Medication> {
        self.medication_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Medication {} not found", id)))
    }

    async fn ensure_batch_available(
        &self,
        request: &MedicationRequest,
        current_id: Option<&str>,
    ) -> ApiResult<()> {
        match self
            .medication_repo
            .find_by_name_and_batch(request.name.trim(), request.batch_number.trim())
            .await?
        {
            Some(existing) if Some(existing.id.as_str()) != current_id => Err(ApiError::Conflict(
                "A medication with this name and batch already exists".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
