use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A doctor designated as the managing head of a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentHead {
    pub id: String,
    pub doctor_id: String,
    pub department_id: String,
    pub appointed_at: String,
}

/// Head of a department with the doctor and department names pulled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentHeadDetails {
    pub id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub department_id: String,
    pub department_name: String,
    pub appointed_at: String,
}

// DTOs for API requests/responses

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointHeadRequest {
    pub doctor_id: String,
}

#[derive(Debug, Serialize)]
pub struct DepartmentResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Department {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = now_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl DepartmentHead {
    pub fn new(doctor_id: String, department_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doctor_id,
            department_id,
            appointed_at: now_rfc3339(),
        }
    }
}

impl DepartmentRequest {
    pub fn validate(&self) -> DomainResult<()> {
        Validator::new()
            .length("name", &self.name, 2, 100)
            .optional_length("description", self.description.as_deref(), 1, 500)
            .finish()
    }
}

impl From<Department> for DepartmentResponse {
    fn from(department: Department) -> Self {
        Self {
            id: department.id,
            name: department.name,
            description: department.description,
            created_at: department.created_at,
            updated_at: department.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_request_requires_name() {
        let request = DepartmentRequest {
            name: " ".to_string(),
            description: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_department_request_valid() {
        let request = DepartmentRequest {
            name: "Cardiology".to_string(),
            description: Some("Heart and vessels".to_string()),
        };
        assert!(request.validate().is_ok());
    }
}
