use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// A department's request to the central warehouse for replenishment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseRequest {
    pub id: String,
    pub department_id: String,
    pub status: RequestStatus,
    pub requested_at: String,
    pub resolved_at: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<WarehouseRequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseRequestItem {
    pub medication_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseRequestItemDetails {
    pub medication_id: String,
    pub medication_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseRequestDetails {
    pub id: String,
    pub department_id: String,
    pub department_name: String,
    pub status: RequestStatus,
    pub requested_at: String,
    pub resolved_at: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<WarehouseRequestItemDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWarehouseRequest {
    pub department_id: String,
    pub notes: Option<String>,
    pub items: Vec<WarehouseRequestItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WarehouseRequestFilter {
    pub department_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveRequest {
    pub notes: Option<String>,
}

impl CreateWarehouseRequest {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.required("department_id", &self.department_id)
            .check("items", !self.items.is_empty(), "at least one item is required")
            .optional_length("notes", self.notes.as_deref(), 1, 500);

        let mut seen = HashSet::new();
        for (i, item) in self.items.iter().enumerate() {
            let field = format!("items[{}]", i);
            v.required(&field, &item.medication_id)
                .positive(&field, item.quantity)
                .check(
                    &field,
                    seen.insert(item.medication_id.as_str()),
                    "medication listed more than once",
                );
        }
        v.finish()
    }
}

impl WarehouseRequest {
    pub fn new(request: CreateWarehouseRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            department_id: request.department_id,
            status: RequestStatus::Pending,
            requested_at: now_rfc3339(),
            resolved_at: None,
            notes: request.notes,
            items: request.items,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
