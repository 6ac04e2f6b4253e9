use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant configuration relevant to authentication.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub display_name: String,
    /// Domains (or origins) callback URLs may point at.
    pub allowed_domains: Vec<String>,
    /// Accept loopback callback hosts regardless of `allowed_domains`.
    pub allow_localhost: bool,
    /// Whether email + password sign-up is enabled.
    pub credential_enabled: bool,
}

/// Project user as seen by the auth service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub project_id: Uuid,
    pub primary_email: String,
    pub primary_email_verified: bool,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Workflow discriminator stored with every verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationCodeType {
    EmailVerification,
    PasswordReset,
}

impl VerificationCodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "EMAIL_VERIFICATION",
            Self::PasswordReset => "PASSWORD_RESET",
        }
    }
}

impl fmt::Display for VerificationCodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationCodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL_VERIFICATION" => Ok(Self::EmailVerification),
            "PASSWORD_RESET" => Ok(Self::PasswordReset),
            other => Err(format!("unknown verification code type: {other}")),
        }
    }
}

/// Single-use code bound to an email, a payload and a callback URL.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub project_id: Uuid,
    pub code: String,
    pub kind: VerificationCodeType,
    pub email: String,
    /// Workflow-defined data, validated against the workflow's payload type.
    pub payload: serde_json::Value,
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl VerificationCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Persisted refresh token row.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Outbox event for async delivery (verification and reset mails).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Verification code length in characters (alphanumeric, ~285 bits).
pub const VERIFICATION_CODE_LEN: usize = 48;

/// Refresh token length in characters (alphanumeric, ~381 bits).
pub const REFRESH_TOKEN_LEN: usize = 64;

/// Default verification code lifetime in seconds (7 days).
pub const DEFAULT_VERIFICATION_CODE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Default access token lifetime in seconds. Kept short: revoking a refresh
/// token does not reach access tokens already minted from it.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 600;

/// Password length bounds, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 70;
/// bcrypt ignores input past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;
