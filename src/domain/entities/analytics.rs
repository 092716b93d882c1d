use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-doctor success figures over a reporting window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSuccessRate {
    pub doctor_id: String,
    pub doctor_name: String,
    pub department_id: String,
    pub department_name: String,
    pub total_consultations: i64,
    pub successful_consultations: i64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentMonthlyAverage {
    pub department_id: String,
    pub department_name: String,
    pub total_consultations: i64,
    pub average_per_month: f64,
    /// `YYYY-MM` -> consultations, zero-filled for every month in the window.
    pub by_month: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAveragesReport {
    pub from: String,
    pub to: String,
    pub months: u32,
    pub departments: Vec<DepartmentMonthlyAverage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentConsumption {
    pub department_id: String,
    pub department_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationConsumption {
    pub medication_id: String,
    pub medication_name: String,
    pub total_quantity: i64,
    pub consultations: i64,
    pub by_department: Vec<DepartmentConsumption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub patients: i64,
    pub doctors: i64,
    pub departments: i64,
    pub pending_warehouse_requests: i64,
    pub medications_below_minimum: i64,
}

/// Raw consultation facts the success-rate computation works on.
#[derive(Debug, Clone)]
pub struct ConsultationFact {
    pub doctor_id: String,
    pub doctor_name: String,
    pub department_id: String,
    pub department_name: String,
    pub patient_id: String,
    pub consultation_date: String,
    pub derived: bool,
}

/// A derivation out of a department, used to detect failed consultations.
#[derive(Debug, Clone)]
pub struct DerivationFact {
    pub patient_id: String,
    pub origin_department_id: String,
    pub derivation_date: String,
}

#[derive(Debug, Clone)]
pub struct MonthlyCount {
    pub department_id: String,
    pub department_name: String,
    pub month: String,
    pub consultations: i64,
}

#[derive(Debug, Clone)]
pub struct ConsumptionRow {
    pub medication_id: String,
    pub medication_name: String,
    pub department_id: String,
    pub department_name: String,
    pub quantity: i64,
    pub consultations: i64,
}

// Query parameters

#[derive(Debug, Default, Deserialize)]
pub struct SuccessRateQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub follow_up_days: Option<i64>,
    pub department_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyAveragesQuery {
    pub months: Option<u32>,
    pub department_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsumptionQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub department_id: Option<String>,
    pub limit: Option<i64>,
}
