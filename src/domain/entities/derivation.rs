use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;

/// Internal referral of a patient from one department to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Derivation {
    pub id: String,
    pub patient_id: String,
    pub origin_department_id: String,
    pub destination_department_id: String,
    pub derivation_date: String,
    pub reason: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationDetails {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub origin_department_id: String,
    pub origin_department_name: String,
    pub destination_department_id: String,
    pub destination_department_name: String,
    pub derivation_date: String,
    pub reason: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDerivationRequest {
    pub patient_id: String,
    pub origin_department_id: String,
    pub destination_department_id: String,
    pub derivation_date: String,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClinicalRecordFilter {
    pub patient_id: Option<String>,
}

impl CreateDerivationRequest {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.required("patient_id", &self.patient_id)
            .required("origin_department_id", &self.origin_department_id)
            .required("destination_department_id", &self.destination_department_id)
            .check(
                "destination_department_id",
                self.origin_department_id != self.destination_department_id,
                "destination_department_id must differ from origin_department_id",
            );
        let date = v.date("derivation_date", &self.derivation_date);
        v.not_in_future("derivation_date", date)
            .optional_length("reason", self.reason.as_deref(), 1, 500);
        v.finish()
    }
}

impl Derivation {
    pub fn new(request: CreateDerivationRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: request.patient_id,
            origin_department_id: request.origin_department_id,
            destination_department_id: request.destination_department_id,
            derivation_date: request.derivation_date.trim().to_string(),
            reason: request.reason,
            created_at: now_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(origin: &str, destination: &str, date: &str) -> CreateDerivationRequest {
        CreateDerivationRequest {
            patient_id: "patient-1".to_string(),
            origin_department_id: origin.to_string(),
            destination_department_id: destination.to_string(),
            derivation_date: date.to_string(),
            reason: None,
        }
    }

    #[test]
    fn test_valid_derivation() {
        assert!(request("er", "cardio", "2024-01-10").validate().is_ok());
    }

    #[test]
    fn test_same_department_rejected() {
        assert!(request("er", "er", "2024-01-10").validate().is_err());
    }

    #[test]
    fn test_future_date_rejected() {
        assert!(request("er", "cardio", "2999-01-10").validate().is_err());
    }
}
