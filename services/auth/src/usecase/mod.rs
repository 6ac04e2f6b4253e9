pub mod email_verification;
pub mod password;
pub mod password_reset;
pub mod secret;
pub mod session;
pub mod signup;
pub mod verification;
