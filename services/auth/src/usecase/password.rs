use crate::domain::types::{MAX_PASSWORD_BYTES, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
use crate::error::AuthServiceError;

/// Minimal strength policy: length bounds only (bcrypt truncates past 72 bytes).
pub fn check_password_strength(password: &str) -> Result<(), AuthServiceError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AuthServiceError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AuthServiceError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthServiceError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes when UTF-8 encoded"
        )));
    }
    Ok(())
}

/// Normalize an email for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
