use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;

/// What a consultation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationKind {
    Derivation,
    Referral,
}

impl std::fmt::Display for ConsultationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsultationKind::Derivation => write!(f, "derivation"),
            ConsultationKind::Referral => write!(f, "referral"),
        }
    }
}

impl std::str::FromStr for ConsultationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "derivation" => Ok(ConsultationKind::Derivation),
            "referral" => Ok(ConsultationKind::Referral),
            _ => Err(format!("Invalid consultation kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationOutcome {
    Resolved,
    FollowUp,
    /// Patient was sent on to another department.
    Derived,
}

impl std::fmt::Display for ConsultationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsultationOutcome::Resolved => write!(f, "resolved"),
            ConsultationOutcome::FollowUp => write!(f, "follow_up"),
            ConsultationOutcome::Derived => write!(f, "derived"),
        }
    }
}

impl std::str::FromStr for ConsultationOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resolved" => Ok(ConsultationOutcome::Resolved),
            "follow_up" => Ok(ConsultationOutcome::FollowUp),
            "derived" => Ok(ConsultationOutcome::Derived),
            _ => Err(format!("Invalid consultation outcome: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,
    pub kind: ConsultationKind,
    pub source_id: String,
    pub doctor_id: String,
    pub department_id: String,
    pub patient_id: String,
    pub consultation_date: String,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub outcome: ConsultationOutcome,
    pub created_at: String,
}

/// Medication prescribed during a consultation, dispensed from department stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub consultation_id: String,
    pub medication_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionDetails {
    pub medication_id: String,
    pub medication_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationDetails {
    pub id: String,
    pub kind: ConsultationKind,
    pub source_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub department_id: String,
    pub department_name: String,
    pub patient_id: String,
    pub patient_name: String,
    pub consultation_date: String,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub outcome: ConsultationOutcome,
    pub prescriptions: Vec<PrescriptionDetails>,
    pub created_at: String,
}

// DTOs for API requests

#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionRequest {
    pub medication_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConsultationRequest {
    pub kind: String,
    pub source_id: String,
    pub doctor_id: String,
    pub department_id: String,
    pub consultation_date: String,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub outcome: String,
    #[serde(default)]
    pub prescriptions: Vec<PrescriptionRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsultationFilter {
    pub kind: Option<String>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

impl CreateConsultationRequest {
    /// Field rules; source, doctor and stock checks happen in the service.
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.one_of("kind", &self.kind.to_lowercase(), &["derivation", "referral"])
            .required("source_id", &self.source_id)
            .required("doctor_id", &self.doctor_id)
            .required("department_id", &self.department_id)
            .length("diagnosis", &self.diagnosis, 3, 500)
            .optional_length("treatment", self.treatment.as_deref(), 1, 1000)
            .one_of(
                "outcome",
                &self.outcome.to_lowercase(),
                &["resolved", "follow_up", "derived"],
            );
        let date = v.date("consultation_date", &self.consultation_date);
        v.not_in_future("consultation_date", date);

        let mut seen = HashSet::new();
        for (i, item) in self.prescriptions.iter().enumerate() {
            let field = format!("prescriptions[{}]", i);
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

impl Consultation {
    pub fn new(
        request: &CreateConsultationRequest,
        kind: ConsultationKind,
        outcome: ConsultationOutcome,
        patient_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            source_id: request.source_id.clone(),
            doctor_id: request.doctor_id.clone(),
            department_id: request.department_id.clone(),
            patient_id,
            consultation_date: request.consultation_date.trim().to_string(),
            diagnosis: request.diagnosis.trim().to_string(),
            treatment: request.treatment.clone(),
            outcome,
            created_at: now_rfc3339(),
        }
    }

    pub fn prescriptions(&self, requests: &[PrescriptionRequest]) -> Vec<Prescription> {
        requests
            .iter()
            .map(|p| Prescription {
                consultation_id: self.id.clone(),
                medication_id: p.medication_id.clone(),
                quantity: p.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;

    fn request() -> CreateConsultationRequest {
        CreateConsultationRequest {
            kind: "derivation".to_string(),
            source_id: "der-1".to_string(),
            doctor_id: "doc-1".to_string(),
            department_id: "dep-1".to_string(),
            consultation_date: "2024-04-02".to_string(),
            diagnosis: "Essential hypertension".to_string(),
            treatment: Some("Enalapril 10mg daily".to_string()),
            outcome: "follow_up".to_string(),
            prescriptions: vec![PrescriptionRequest {
                medication_id: "med-1".to_string(),
                quantity: 30,
            }],
        }
    }

    #[test]
    fn test_valid_consultation() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_duplicate_prescription_rejected() {
        let mut req = request();
        req.prescriptions.push(PrescriptionRequest {
            medication_id: "med-1".to_string(),
            quantity: 5,
        });
        match req.validate() {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "prescriptions[1]");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_and_outcome() {
        let req = CreateConsultationRequest {
            kind: "walk_in".to_string(),
            outcome: "cured".to_string(),
            ..request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_enum_round_trip_text() {
        assert_eq!(
            "follow_up".parse::<ConsultationOutcome>().unwrap(),
            ConsultationOutcome::FollowUp
        );
        assert_eq!(ConsultationKind::Referral.to_string(), "referral");
    }
}
