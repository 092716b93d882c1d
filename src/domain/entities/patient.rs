use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use time::macros::date;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub const ALL: &'static [&'static str] = &["male", "female", "other"];
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
            Sex::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            _ => Err(format!("Invalid sex: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub identification_number: String,
    pub birth_date: String,
    pub sex: Sex,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientRequest {
    pub name: String,
    pub identification_number: String,
    pub birth_date: String,
    pub sex: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatientResponse {
    pub id: String,
    pub name: String,
    pub identification_number: String,
    pub birth_date: String,
    pub sex: Sex,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatientFilter {
    /// Case-insensitive substring match on the patient name.
    pub q: Option<String>,
}

fn identification_regex() -> &'static Regex {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    ID_REGEX.get_or_init(|| Regex::new(r"^\d{6,20}$").expect("Invalid identification regex"))
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9 \-]{7,20}$").expect("Invalid phone regex"))
}

impl PatientRequest {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.length("name", &self.name, 2, 100).matches(
            "identification_number",
            &self.identification_number,
            identification_regex(),
            "identification_number must be 6-20 digits",
        );

        let birth_date = v.date("birth_date", &self.birth_date);
        v.not_in_future("birth_date", birth_date);
        if let Some(birth_date) = birth_date {
            v.check(
                "birth_date",
                birth_date >= date!(1900 - 01 - 01),
                "birth_date cannot be earlier than 1900-01-01",
            );
        }

        v.one_of("sex", &self.sex.to_lowercase(), Sex::ALL);

        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            v.matches(
                "phone",
                phone,
                phone_regex(),
                "phone must be 7-20 digits, spaces, dashes, optionally prefixed with +",
            );
        }
        v.optional_length("address", self.address.as_deref(), 1, 250);

        v.finish()
    }

    /// Build the entity; call after [`validate`](Self::validate).
    pub fn into_patient(self, id: String, created_at: String) -> Patient {
        Patient {
            id,
            name: self.name.trim().to_string(),
            identification_number: self.identification_number.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
            sex: self.sex.parse().unwrap_or(Sex::Other),
            phone: normalize_optional(self.phone),
            address: normalize_optional(self.address),
            created_at,
            updated_at: now_rfc3339(),
        }
    }
}

impl Patient {
    pub fn new(request: PatientRequest) -> Self {
        request.into_patient(Uuid::new_v4().to_string(), now_rfc3339())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            identification_number: patient.identification_number,
            birth_date: patient.birth_date,
            sex: patient.sex,
            phone: patient.phone,
            address: patient.address,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// Everything recorded for a patient, newest first in each list.
#[derive(Debug, Serialize)]
pub struct ClinicalHistoryResponse {
    pub patient: PatientResponse,
    pub derivations: Vec<super::DerivationDetails>,
    pub referrals: Vec<super::ReferralDetails>,
    pub consultations: Vec<super::ConsultationDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> PatientRequest {
        PatientRequest {
            name: "Ana Pérez".to_string(),
            identification_number: "85010112345".to_string(),
            birth_date: "1985-01-01".to_string(),
            sex: "female".to_string(),
            phone: Some("+53 5555-1234".to_string()),
            address: None,
        }
    }

    fn failed_fields(request: &PatientRequest) -> Vec<String> {
        match request.validate() {
            Err(crate::domain::errors::DomainError::Validation(errors)) => {
                errors.into_iter().map(|e| e.field).collect()
            }
            _ => vec![],
        }
    }

    #[test]
    fn test_valid_patient() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_identification_must_be_digits() {
        let request = PatientRequest {
            identification_number: "AB12345".to_string(),
            ..valid_request()
        };
        assert_eq!(failed_fields(&request), vec!["identification_number"]);
    }

    #[test]
    fn test_birth_date_bounds() {
        let future = PatientRequest {
            birth_date: "2999-01-01".to_string(),
            ..valid_request()
        };
        assert_eq!(failed_fields(&future), vec!["birth_date"]);

        let ancient = PatientRequest {
            birth_date: "1850-06-01".to_string(),
            ..valid_request()
        };
        assert_eq!(failed_fields(&ancient), vec!["birth_date"]);
    }

    #[test]
    fn test_blank_phone_is_ignored_and_dropped() {
        let request = PatientRequest {
            phone: Some("   ".to_string()),
            ..valid_request()
        };
        assert!(request.validate().is_ok());
        assert!(Patient::new(request).phone.is_none());
    }

    #[test]
    fn test_sex_is_case_insensitive() {
        let request = PatientRequest {
            sex: "Male".to_string(),
            ..valid_request()
        };
        assert!(request.validate().is_ok());
        assert_eq!(Patient::new(request).sex, Sex::Male);
    }
}
