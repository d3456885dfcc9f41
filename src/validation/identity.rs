use crate::error::{AppError, Result};
use crate::models::session::CREDENTIAL_SEPARATOR;

/// Longest identity accepted, in bytes.
pub const MAX_IDENTITY_LEN: usize = 255;

/// Validates an identity before a session is issued for it.
///
/// The identity is stored verbatim and later recovered by splitting the
/// credential at the first separator, so it must not contain the separator
/// and must not carry whitespace that the credential parser would trim away.
///
/// # Arguments
///
/// * `identity` - The identity to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the identity is usable.
pub fn validate_identity(identity: &str) -> Result<()> {
    if identity.is_empty() {
        return Err(AppError::Validation("Identity cannot be empty".to_string()));
    }

    if identity.len() > MAX_IDENTITY_LEN {
        return Err(AppError::Validation(format!(
            "Identity must be at most {} bytes",
            MAX_IDENTITY_LEN
        )));
    }

    if identity.trim() != identity {
        return Err(AppError::Validation(
            "Identity cannot start or end with whitespace".to_string(),
        ));
    }

    if identity.contains(CREDENTIAL_SEPARATOR) {
        return Err(AppError::Validation(format!(
            "Identity cannot contain '{}'",
            CREDENTIAL_SEPARATOR
        )));
    }

    Ok(())
}

/// Validates a username submitted to the login endpoint.
///
/// # Arguments
///
/// * `username` - The username to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the username is valid.
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters long".to_string(),
        ));
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(AppError::Validation(
            "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    validate_identity(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity("alice").is_ok());
        assert!(validate_identity("alice@example.com").is_ok());
        assert!(validate_identity("first last").is_ok());

        assert!(validate_identity("").is_err());
        assert!(validate_identity("a:b").is_err());
        assert!(validate_identity(" alice").is_err());
        assert!(validate_identity("alice ").is_err());
        assert!(validate_identity(&"x".repeat(MAX_IDENTITY_LEN + 1)).is_err());
        assert!(validate_identity(&"x".repeat(MAX_IDENTITY_LEN)).is_ok());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("bob-smith").is_ok());

        assert!(validate_username("al").is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("alice:x").is_err());
        assert!(validate_username("alice;").is_err());
    }
}
