//! Declarative rule builder for request DTOs.
//!
//! Each rule records a [`FieldError`] instead of failing fast, so a client
//! gets every problem with a request in one 400 response.

use regex::Regex;
use time::Date;

use crate::domain::errors::{DomainError, DomainResult, FieldError};
use crate::shared::timestamps::{parse_date, today};

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Cross-field or custom rule: records `message` when `condition` is false.
    pub fn check(&mut self, field: &str, condition: bool, message: &str) -> &mut Self {
        if !condition {
            self.add(field, message);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", field));
        }
        self
    }

    /// Non-blank and between `min` and `max` characters after trimming.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return self.add(field, format!("{} is required", field));
        }
        let len = trimmed.chars().count();
        if len < min || len > max {
            self.add(
                field,
                format!("{} must be between {} and {} characters", field, min, max),
            );
        }
        self
    }

    pub fn optional_length(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> &mut Self {
        match value {
            Some(v) => self.length(field, v, min, max),
            None => self,
        }
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.add(
                field,
                format!("{} must be one of: {}", field, allowed.join(", ")),
            );
        }
        self
    }

    pub fn matches(
        &mut self,
        field: &str,
        value: &str,
        pattern: &Regex,
        message: &str,
    ) -> &mut Self {
        if !pattern.is_match(value.trim()) {
            self.add(field, message);
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i64) -> &mut Self {
        self.check(field, value >= 0, &format!("{} must not be negative", field))
    }

    pub fn positive(&mut self, field: &str, value: i64) -> &mut Self {
        self.check(field, value > 0, &format!("{} must be greater than zero", field))
    }

    pub fn positive_f64(&mut self, field: &str, value: f64) -> &mut Self {
        self.check(
            field,
            value.is_finite() && value > 0.0,
            &format!("{} must be greater than zero", field),
        )
    }

    /// Parses a `YYYY-MM-DD` date; records an error and returns `None` when invalid.
    pub fn date(&mut self, field: &str, value: &str) -> Option<Date> {
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.add(field, format!("{} must be a valid date (YYYY-MM-DD)", field));
        }
        parsed
    }

    pub fn not_in_future(&mut self, field: &str, value: Option<Date>) -> &mut Self {
        if let Some(date) = value {
            self.check(field, date <= today(), &format!("{} cannot be in the future", field));
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&mut self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(result: DomainResult<()>) -> Vec<String> {
        match result {
            Err(DomainError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            Ok(()) => vec![],
        }
    }

    #[test]
    fn test_collects_all_failures() {
        let mut v = Validator::new();
        v.length("name", " ", 2, 10)
            .one_of("sex", "unknown", &["male", "female", "other"])
            .positive("quantity", 0);
        assert_eq!(field_names(v.finish()), vec!["name", "sex", "quantity"]);
    }

    #[test]
    fn test_length_counts_characters() {
        let mut v = Validator::new();
        v.length("name", "Óscar", 5, 5);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_optional_length_skips_none() {
        let mut v = Validator::new();
        v.optional_length("reason", None, 3, 10);
        assert!(v.is_valid());
        v.optional_length("reason", Some("ab"), 3, 10);
        assert!(!v.is_valid());
    }

    #[test]
    fn test_date_rules() {
        let mut v = Validator::new();
        let parsed = v.date("birth_date", "3000-01-01");
        v.not_in_future("birth_date", parsed);
        let bad = v.date("visit_date", "yesterday");
        assert!(bad.is_none());
        assert_eq!(field_names(v.finish()), vec!["birth_date", "visit_date"]);
    }

    #[test]
    fn test_check_cross_field() {
        let mut v = Validator::new();
        v.check("min_quantity", 10 <= 5, "min_quantity must not exceed max_quantity");
        assert_eq!(field_names(v.finish()), vec!["min_quantity"]);
    }
}
