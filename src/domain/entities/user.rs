use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::shared::timestamps::now_rfc3339;
use crate::shared::utils::SPECIAL_CHARS;
use crate::shared::Validator;
use regex::Regex;

use super::Role;

/// Application account; optionally linked to the doctor it represents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub doctor_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// DTOs for API requests/responses

/// Register a user. When `password` is omitted a random one is generated
/// and returned once in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: Option<String>,
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    /// `Some(None)` unlinks the doctor; absent leaves it unchanged.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub doctor_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub doctor_id: Option<String>,
    pub roles: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: UserResponse,
    /// Present only when the password was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: String,
    pub user: UserResponse,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-z0-9_.-]{3,32}$").expect("Invalid username regex"))
}

/// Validates password complexity requirements
/// - 10-72 characters long
/// - Contains uppercase letter
/// - Contains lowercase letter
/// - Contains digit
/// - Contains special character
pub fn validate_password_complexity(field: &str, password: &str) -> DomainResult<()> {
    let len = password.chars().count();
    let mut v = Validator::new();
    v.check(
        field,
        (10..=72).contains(&len),
        "Password must be 10-72 characters long",
    )
    .check(
        field,
        password.chars().any(|c| c.is_uppercase()),
        "Password must contain at least one uppercase letter",
    )
    .check(
        field,
        password.chars().any(|c| c.is_lowercase()),
        "Password must contain at least one lowercase letter",
    )
    .check(
        field,
        password.chars().any(|c| c.is_ascii_digit()),
        "Password must contain at least one digit",
    )
    .check(
        field,
        password.bytes().any(|c| SPECIAL_CHARS.contains(&c)),
        "Password must contain at least one special character (!@#$%^&*()_+-=[]{}|;:,.<>?)",
    );
    v.finish()
}

impl CreateUserRequest {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.matches(
            "username",
            &self.username.to_lowercase(),
            username_regex(),
            "username must be 3-32 characters of a-z, 0-9, '_', '.', '-'",
        )
        .length("full_name", &self.full_name, 2, 100);

        let mut errors = match v.finish() {
            Err(DomainError::Validation(errors)) => errors,
            _ => Vec::new(),
        };
        if let Err(DomainError::Validation(mut more)) =
            crate::shared::utils::email_validator::validate_and_normalize_email(&self.email)
        {
            errors.append(&mut more);
        }
        if let Some(password) = &self.password {
            if let Err(DomainError::Validation(mut more)) =
                validate_password_complexity("password", password)
            {
                errors.append(&mut more);
            }
        }
        for role in &self.roles {
            if role.parse::<super::RoleName>().is_err() {
                errors.push(crate::domain::errors::FieldError::new(
                    "roles",
                    format!("Unknown role: {}", role),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

impl UpdateUserRequest {
    pub fn validate(&self) -> DomainResult<()> {
        Validator::new()
            .optional_length("full_name", self.full_name.as_deref(), 2, 100)
            .finish()
    }
}

impl User {
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        password_hash: String,
        doctor_id: Option<String>,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_lowercase(),
            email,
            full_name: full_name.trim().to_string(),
            password_hash,
            is_active: true,
            doctor_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn into_response(self, roles: &[Role]) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            is_active: self.is_active,
            doctor_id: self.doctor_id,
            roles: roles.iter().map(|r| r.name.clone()).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            username: "m.grey".to_string(),
            email: "m.grey@seattle-grace.org".to_string(),
            full_name: "Meredith Grey".to_string(),
            password: Some("SecureP@ssw0rd".to_string()),
            doctor_id: None,
            roles: vec!["Doctor".to_string()],
        }
    }

    #[test]
    fn test_valid_user_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_collects_errors_from_all_rules() {
        let req = CreateUserRequest {
            username: "a b".to_string(),
            email: "not-an-email".to_string(),
            password: Some("short".to_string()),
            roles: vec!["Janitor".to_string()],
            ..request()
        };
        match req.validate() {
            Err(DomainError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"username"));
                assert!(fields.contains(&"email"));
                assert!(fields.contains(&"password"));
                assert!(fields.contains(&"roles"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_password_too_short() {
        assert!(validate_password_complexity("password", "Short1!").is_err());
    }

    #[test]
    fn test_password_no_special() {
        assert!(validate_password_complexity("password", "Lowercase123").is_err());
    }

    #[test]
    fn test_password_no_uppercase() {
        assert!(validate_password_complexity("password", "lowercase123!").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password_complexity("password", "SecureP@ssw0rd").is_ok());
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: UpdateUserRequest = serde_json::from_str(r#"{"full_name": "X Y"}"#).unwrap();
        assert!(absent.doctor_id.is_none());

        let cleared: UpdateUserRequest = serde_json::from_str(r#"{"doctor_id": null}"#).unwrap();
        assert_eq!(cleared.doctor_id, Some(None));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "admin".to_string(),
            "admin@clinic.org".to_string(),
            "Admin".to_string(),
            "$argon2id$secret".to_string(),
            None,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
