use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// Verification-code failures are deliberately distinct (not found, expired,
/// already used) so callers can tell a user "this link is invalid" apart from
/// "this link has expired".
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("project not found")]
    ProjectNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("a user with this email already exists")]
    UserAlreadyExists,
    #[error("password authentication is not enabled for this project")]
    PasswordAuthNotEnabled,
    #[error("weak password: {0}")]
    WeakPassword(String),
    #[error("verification code not found")]
    VerificationCodeNotFound,
    #[error("verification code expired")]
    VerificationCodeExpired,
    #[error("verification code already used")]
    VerificationCodeAlreadyUsed,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("redirect url not allowed")]
    RedirectUrlNotAllowed,
    #[error("refresh token not found")]
    RefreshTokenNotFound,
    #[error("invalid access token")]
    AccessTokenInvalid,
    #[error("access token expired")]
    AccessTokenExpired,
    /// A stored payload does not match its workflow's schema. This is a
    /// defect, never a user error.
    #[error("verification payload does not match workflow schema: {0}")]
    PayloadSchemaMismatch(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_EMAIL_ALREADY_EXISTS",
            Self::PasswordAuthNotEnabled => "PASSWORD_AUTHENTICATION_NOT_ENABLED",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::VerificationCodeNotFound => "VERIFICATION_CODE_NOT_FOUND",
            Self::VerificationCodeExpired => "VERIFICATION_CODE_EXPIRED",
            Self::VerificationCodeAlreadyUsed => "VERIFICATION_CODE_ALREADY_USED",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::RedirectUrlNotAllowed => "REDIRECT_URL_NOT_WHITELISTED",
            Self::RefreshTokenNotFound => "REFRESH_TOKEN_NOT_FOUND",
            Self::AccessTokenInvalid => "INVALID_ACCESS_TOKEN",
            Self::AccessTokenExpired => "ACCESS_TOKEN_EXPIRED",
            Self::PayloadSchemaMismatch(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::ProjectNotFound | Self::UserNotFound | Self::VerificationCodeNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UserAlreadyExists | Self::VerificationCodeAlreadyUsed => StatusCode::CONFLICT,
            Self::PasswordAuthNotEnabled => StatusCode::FORBIDDEN,
            Self::WeakPassword(_) | Self::InvalidPayload(_) | Self::RedirectUrlNotAllowed => {
                StatusCode::BAD_REQUEST
            }
            Self::VerificationCodeExpired => StatusCode::GONE,
            Self::RefreshTokenNotFound | Self::AccessTokenInvalid | Self::AccessTokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::PayloadSchemaMismatch(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records method/uri/status; only defects need their cause logged.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
            }
            Self::PayloadSchemaMismatch(detail) => {
                tracing::error!(%detail, kind = "PAYLOAD_SCHEMA_MISMATCH", "misconfigured workflow");
            }
            _ => {}
        }
        // Misconfiguration details stay in the log, not in the response.
        let message = match &self {
            Self::PayloadSchemaMismatch(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}
