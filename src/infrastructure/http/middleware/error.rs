use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::domain::errors::{DomainError, FieldError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Validation(Vec<FieldError>),
    Unauthorized,
    Forbidden(String),
    Internal(String),
    Conflict(String),
    TooManyRequests(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed")?;
                for e in errors {
                    write!(f, "; {}: {}", e.field, e.message)?;
                }
                Ok(())
            }
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::TooManyRequests(msg) => write!(f, "Too many requests: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(details) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    ApiError::Conflict(unique_violation_message(message))
                } else if message.contains("FOREIGN KEY") || message.contains("foreign key") {
                    ApiError::Conflict(
                        "Operation violates a reference to another record".to_string(),
                    )
                } else if message.contains("CHECK") || message.contains("check constraint") {
                    ApiError::Conflict(format!("Constraint violated: {}", message))
                } else {
                    ApiError::Internal(format!("Database error: {}", message))
                }
            }
            other => ApiError::Internal(format!("Database error: {}", other)),
        }
    }
}

/// Maps a UNIQUE constraint message onto the field the client sent.
fn unique_violation_message(message: &str) -> String {
    const KNOWN: &[(&str, &str)] = &[
        ("departments.name", "A department with this name already exists"),
        ("idx_departments_name", "A department with this name already exists"),
        ("doctors.license_number", "A doctor with this license number already exists"),
        (
            "patients.identification_number",
            "A patient with this identification number already exists",
        ),
        ("medications.name", "A medication with this name and batch already exists"),
        ("department_heads.department_id", "The department already has a head"),
        ("stock_departments", "Stock for this medication already exists in the department"),
        ("users.username", "Username already taken"),
        ("users.email", "Email already registered"),
        ("user_roles", "Role already assigned"),
    ];

    KNOWN
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, msg)| msg.to_string())
        .unwrap_or_else(|| "Record already exists".to_string())
}

// Convert from argon2 errors
impl From<argon2::password_hash::Error> for ApiError {
    fn from(_: argon2::password_hash::Error) -> Self {
        ApiError::Internal("Password hashing error".to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("Rejected access token: {}", err);
        ApiError::Unauthorized
    }
}

// Convert from domain errors
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => ApiError::Validation(errors),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_known_columns() {
        assert_eq!(
            unique_violation_message("UNIQUE constraint failed: patients.identification_number"),
            "A patient with this identification number already exists"
        );
        assert_eq!(
            unique_violation_message("UNIQUE constraint failed: users.username"),
            "Username already taken"
        );
        assert_eq!(
            unique_violation_message("UNIQUE constraint failed: something.else"),
            "Record already exists"
        );
    }

    #[test]
    fn test_domain_validation_becomes_bad_request() {
        let err: ApiError =
            DomainError::Validation(vec![FieldError::new("name", "Name is required")]).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = ApiError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
