use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;
use regex::Regex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub department_id: String,
    pub license_number: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRequest {
    pub name: String,
    pub specialty: String,
    pub department_id: String,
    pub license_number: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorResponse {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub department_id: String,
    pub license_number: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorFilter {
    pub department_id: Option<String>,
}

fn license_regex() -> &'static Regex {
    static LICENSE_REGEX: OnceLock<Regex> = OnceLock::new();
    LICENSE_REGEX.get_or_init(|| Regex::new(r"^[A-Z0-9-]{4,20}$").expect("Invalid license regex"))
}

impl Doctor {
    pub fn new(request: DoctorRequest) -> Self {
        let now = now_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            specialty: request.specialty.trim().to_string(),
            department_id: request.department_id,
            license_number: request.license_number.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl DoctorRequest {
    /// Field rules only; the department existence check needs the repository.
    pub fn validate(&self) -> DomainResult<()> {
        Validator::new()
            .length("name", &self.name, 2, 100)
            .length("specialty", &self.specialty, 2, 100)
            .required("department_id", &self.department_id)
            .matches(
                "license_number",
                &self.license_number,
                license_regex(),
                "license_number must be 4-20 uppercase letters, digits or dashes",
            )
            .finish()
    }
}

impl From<Doctor> for DoctorResponse {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            specialty: doctor.specialty,
            department_id: doctor.department_id,
            license_number: doctor.license_number,
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        }
    }
}
