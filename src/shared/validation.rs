//! Validation Utilities

use validator::{ValidationError, ValidationErrors};

use super::error::ServiceError;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 32;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Convert validation errors to a `ServiceError::InvalidArgument`.
///
/// Only the first failing field is reported, sorted by field name so the
/// message is stable across runs.
pub fn validation_error(errors: ValidationErrors) -> ServiceError {
    let mut field_errors: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                (
                    field.to_string(),
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                )
            })
        })
        .collect();
    field_errors.sort();

    let message = field_errors
        .first()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .unwrap_or_else(|| "Validation failed".into());

    ServiceError::InvalidArgument(message)
}

/// Username: 3-32 characters of ASCII letters, digits, `_`, `.` or `-`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::new("length")
            .with_message("Username must be 3-32 characters".into()));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::new("charset").with_message(
            "Username may only contain letters, digits, '_', '.' and '-'".into(),
        ));
    }

    Ok(())
}

/// Password: 8-128 characters with at least one letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::new("length")
            .with_message("Password must be 8-128 characters".into()));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ValidationError::new("strength").with_message(
            "Password must contain at least one letter and one digit".into(),
        ));
    }

    Ok(())
}

/// Lowercase and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
