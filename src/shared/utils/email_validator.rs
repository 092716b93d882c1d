use crate::domain::errors::{DomainError, DomainResult};

pub fn validate_and_normalize_email(email: &str) -> DomainResult<String> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(DomainError::invalid(
            "email",
            "Invalid email format. Must be in format user@domain.tld",
        ));
    }

    // email_address accepts dotless domains; a hospital directory never has those
    if let Some(at_pos) = trimmed.find('@') {
        let domain_part = &trimmed[at_pos + 1..];
        if !domain_part.contains('.') {
            return Err(DomainError::invalid(
                "email",
                "Invalid email format. Domain must include a TLD (e.g., .com, .org)",
            ));
        }
    }

    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert_eq!(
            validate_and_normalize_email("nurse@clinic.org").unwrap(),
            "nurse@clinic.org"
        );
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(
            validate_and_normalize_email("  Dr.House@Clinic.ORG ").unwrap(),
            "dr.house@clinic.org"
        );
    }

    #[test]
    fn test_invalid_email_no_at() {
        assert!(validate_and_normalize_email("clinic.org").is_err());
    }

    #[test]
    fn test_invalid_email_no_tld() {
        assert!(validate_and_normalize_email("admin@localhost").is_err());
    }

    #[test]
    fn test_invalid_email_reports_field() {
        match validate_and_normalize_email("nope") {
            Err(DomainError::Validation(errors)) => assert_eq!(errors[0].field, "email"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
