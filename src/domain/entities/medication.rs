use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Cream,
    Drops,
    Other,
}

impl Presentation {
    pub const ALL: &'static [&'static str] = &[
        "tablet",
        "capsule",
        "syrup",
        "injection",
        "cream",
        "drops",
        "other",
    ];
}

impl std::fmt::Display for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Presentation::Tablet => "tablet",
            Presentation::Capsule => "capsule",
            Presentation::Syrup => "syrup",
            Presentation::Injection => "injection",
            Presentation::Cream => "cream",
            Presentation::Drops => "drops",
            Presentation::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Presentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tablet" => Ok(Presentation::Tablet),
            "capsule" => Ok(Presentation::Capsule),
            "syrup" => Ok(Presentation::Syrup),
            "injection" => Ok(Presentation::Injection),
            "cream" => Ok(Presentation::Cream),
            "drops" => Ok(Presentation::Drops),
            "other" => Ok(Presentation::Other),
            _ => Err(format!("Invalid presentation: {}", s)),
        }
    }
}

/// A medication batch held in the central warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub presentation: Presentation,
    pub dosage_mg: f64,
    pub batch_number: String,
    pub expiration_date: String,
    pub warehouse_quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Quantity of a medication held at a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDepartment {
    pub id: String,
    pub department_id: String,
    pub medication_id: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDetails {
    pub id: String,
    pub department_id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub below_minimum: bool,
    pub updated_at: String,
}

// DTOs for API requests/responses

#[derive(Debug, Clone, Deserialize)]
pub struct MedicationRequest {
    pub name: String,
    pub presentation: String,
    pub dosage_mg: f64,
    pub batch_number: String,
    pub expiration_date: String,
    #[serde(default)]
    pub warehouse_quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub max_quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct MedicationResponse {
    pub id: String,
    pub name: String,
    pub presentation: Presentation,
    pub dosage_mg: f64,
    pub batch_number: String,
    pub expiration_date: String,
    pub warehouse_quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub below_minimum: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicationFilter {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub before: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertStockRequest {
    pub medication_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub max_quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Signed change applied to the current quantity.
    pub delta: i64,
}

impl MedicationRequest {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.length("name", &self.name, 2, 100)
            .one_of(
                "presentation",
                &self.presentation.to_lowercase(),
                Presentation::ALL,
            )
            .positive_f64("dosage_mg", self.dosage_mg)
            .length("batch_number", &self.batch_number, 1, 50);
        v.date("expiration_date", &self.expiration_date);
        v.non_negative("warehouse_quantity", self.warehouse_quantity)
            .non_negative("min_quantity", self.min_quantity)
            .non_negative("max_quantity", self.max_quantity)
            .check(
                "min_quantity",
                self.min_quantity <= self.max_quantity,
                "min_quantity must not exceed max_quantity",
            )
            .check(
                "warehouse_quantity",
                self.warehouse_quantity <= self.max_quantity,
                "warehouse_quantity must not exceed max_quantity",
            );
        v.finish()
    }

    pub fn into_medication(self, id: String, created_at: String) -> Medication {
        Medication {
            id,
            name: self.name.trim().to_string(),
            presentation: self.presentation.parse().unwrap_or(Presentation::Other),
            dosage_mg: self.dosage_mg,
            batch_number: self.batch_number.trim().to_string(),
            expiration_date: self.expiration_date.trim().to_string(),
            warehouse_quantity: self.warehouse_quantity,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            created_at,
            updated_at: now_rfc3339(),
        }
    }
}

impl UpsertStockRequest {
    pub fn validate(&self) -> DomainResult<()> {
        Validator::new()
            .required("medication_id", &self.medication_id)
            .non_negative("quantity", self.quantity)
            .non_negative("min_quantity", self.min_quantity)
            .non_negative("max_quantity", self.max_quantity)
            .check(
                "min_quantity",
                self.min_quantity <= self.max_quantity,
                "min_quantity must not exceed max_quantity",
            )
            .finish()
    }
}

impl Medication {
    pub fn new(request: MedicationRequest) -> Self {
        request.into_medication(Uuid::new_v4().to_string(), now_rfc3339())
    }

    pub fn is_below_minimum(&self) -> bool {
        self.warehouse_quantity < self.min_quantity
    }
}

impl StockDepartment {
    pub fn new(department_id: String, request: UpsertStockRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            department_id,
            medication_id: request.medication_id,
            quantity: request.quantity,
            min_quantity: request.min_quantity,
            max_quantity: request.max_quantity,
            updated_at: now_rfc3339(),
        }
    }
}

impl From<Medication> for MedicationResponse {
    fn from(medication: Medication) -> Self {
        let below_minimum = medication.is_below_minimum();
        Self {
            id: medication.id,
            name: medication.name,
            presentation: medication.presentation,
            dosage_mg: medication.dosage_mg,
            batch_number: medication.batch_number,
            expiration_date: medication.expiration_date,
            warehouse_quantity: medication.warehouse_quantity,
            min_quantity: medication.min_quantity,
            max_quantity: medication.max_quantity,
            below_minimum,
            created_at: medication.created_at,
            updated_at: medication.updated_at,
        }
    }
}
