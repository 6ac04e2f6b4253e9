use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::handlers::extract::{ProjectId, RefreshTokenHeader};
use crate::state::AppState;
use crate::usecase::session::SessionIdentity;

pub type BearerHeader = TypedHeader<Authorization<Bearer>>;

/// Verify the bearer access token and bind it to the requesting project.
/// A token minted for another project is rejected as invalid.
pub(crate) fn authenticate(
    state: &AppState,
    project_id: Uuid,
    bearer: Option<BearerHeader>,
) -> Result<SessionIdentity, AuthServiceError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthServiceError::AccessTokenInvalid)?;
    let identity = state.sessions().verify_access_token(bearer.token())?;
    if identity.project_id != project_id {
        return Err(AuthServiceError::AccessTokenInvalid);
    }
    Ok(identity)
}

// ── GET /auth/sessions/current ────────────────────────────────────────────────

pub async fn current_session(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    bearer: Option<BearerHeader>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let identity = authenticate(&state, project_id, bearer)?;
    Ok(Json(identity))
}

// ── POST /auth/sessions/current/refresh ───────────────────────────────────────

pub async fn refresh_session(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    RefreshTokenHeader(refresh_token): RefreshTokenHeader,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;
    let access = state
        .sessions()
        .refresh_access_token(project.id, &refresh_token)
        .await?;
    Ok(Json(access))
}

// ── DELETE /auth/sessions/current ─────────────────────────────────────────────

pub async fn revoke_session(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    RefreshTokenHeader(refresh_token): RefreshTokenHeader,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;
    state
        .sessions()
        .revoke_refresh_token(project.id, &refresh_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
