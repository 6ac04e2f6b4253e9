pub mod email_verification;
pub mod extract;
pub mod password_reset;
pub mod session;
pub mod signup;

use serde::Serialize;

/// Body of the code pre-check endpoints.
#[derive(Serialize)]
pub struct CheckCodeResponse {
    pub is_code_valid: bool,
}
