use std::sync::LazyLock;

use regex::Regex;
use crate::error::{AppError, AppResult};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError(format!(
            "Invalid email address: {email}"
        )));
    }
    Ok(())
}

/// Trims and lower-cases an email so uniqueness is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("first.last+books@mail.example.org").is_ok());
        assert!(validate_email("no-at-sign.example.com").is_err());
        assert!(validate_email("reader@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Reader@Example.COM "), "reader@example.com");
    }
}
