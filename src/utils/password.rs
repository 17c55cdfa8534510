use crate::error::{AppError, AppResult};

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 128;

/// Rejects passwords outside 8..=128 characters or missing a lower-case
/// letter, an upper-case letter or a digit. The message names what is missing.
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(AppError::ValidationError(format!(
            "Password must be between {MIN_LEN} and {MAX_LEN} characters"
        )));
    }

    let missing: Vec<&str> = [
        (password.chars().any(char::is_lowercase), "a lower-case letter"),
        (password.chars().any(char::is_uppercase), "an upper-case letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
    ]
    .into_iter()
    .filter_map(|(present, what)| (!present).then_some(what))
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Password needs {}",
            missing.join(", ")
        )))
    }
}

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// `Ok(false)` on a wrong password; an error only when `hash` is not a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123").is_ok());
        assert!(validate_password("Pass123").is_err());
        assert!(validate_password(&"Aa1".repeat(43)).is_err());
    }

    #[test]
    fn test_validate_password_names_missing_classes() {
        match validate_password("password") {
            Err(AppError::ValidationError(msg)) => {
                assert_eq!(msg, "Password needs an upper-case letter, a digit")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        match validate_password("PASSWORD123") {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("lower-case")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("Password123", 4).unwrap();

        assert!(verify_password("Password123", &hashed).unwrap());
        assert!(!verify_password("WrongPassword1", &hashed).unwrap());
    }

    #[test]
    fn test_bcrypt_failures_surface_as_bcrypt_errors() {
        let err = verify_password("Password123", "not-a-hash").unwrap_err();
        assert!(matches!(err, AppError::BcryptError(_)));

        let err = hash_password("Password123", 2).unwrap_err();
        assert!(matches!(err, AppError::BcryptError(_)));
    }
}
