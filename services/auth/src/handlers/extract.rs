//! Request-scoped extractors for tenant and session headers.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use uuid::Uuid;

/// Header naming the tenant of every request.
pub const X_LATCHKEY_PROJECT_ID: &str = "x-latchkey-project-id";

/// Header carrying the refresh token on refresh and sign-out.
pub const X_LATCHKEY_REFRESH_TOKEN: &str = "x-latchkey-refresh-token";

/// Project (tenant) id from `x-latchkey-project-id`.
///
/// Returns 400 if the header is absent or not a UUID. Whether the project
/// exists is checked by the handler.
#[derive(Debug, Clone, Copy)]
pub struct ProjectId(pub Uuid);

impl<S> FromRequestParts<S> for ProjectId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are read synchronously so the returned future borrows nothing.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let project_id = parts
            .headers
            .get(X_LATCHKEY_PROJECT_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<Uuid>().ok());

        async move { project_id.map(Self).ok_or(StatusCode::BAD_REQUEST) }
    }
}

/// Opaque refresh token from `x-latchkey-refresh-token`.
///
/// Returns 401 if the header is absent or empty.
#[derive(Debug, Clone)]
pub struct RefreshTokenHeader(pub String);

impl<S> FromRequestParts<S> for RefreshTokenHeader
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(X_LATCHKEY_REFRESH_TOKEN)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        async move { token.map(Self).ok_or(StatusCode::UNAUTHORIZED) }
    }
}
