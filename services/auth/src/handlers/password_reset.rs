use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::handlers::CheckCodeResponse;
use crate::handlers::extract::ProjectId;
use crate::state::AppState;
use crate::usecase::password_reset::{
    ResetPasswordUseCase, SendResetCodeInput, SendResetCodeUseCase,
};

// ── POST /auth/password/send-reset-code ───────────────────────────────────────

#[derive(Deserialize)]
pub struct SendResetCodeRequest {
    pub email: String,
    pub callback_url: String,
}

/// Responds 202 whether or not the email belongs to a user.
pub async fn send_reset_code(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    Json(body): Json<SendResetCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;

    let uc = SendResetCodeUseCase {
        users: state.user_repo(),
        reset: state.password_reset(),
    };
    uc.execute(
        &project,
        SendResetCodeInput {
            email: body.email,
            callback_url: body.callback_url,
        },
    )
    .await?;

    Ok(StatusCode::ACCEPTED)
}

// ── POST /auth/password/reset ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub code: String,
    pub password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;

    let uc = ResetPasswordUseCase {
        reset: state.password_reset(),
    };
    let changed = uc.execute(&project, &body.code, body.password).await?;

    Ok(Json(changed))
}

// ── POST /auth/password/reset/check-code ──────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckResetCodeRequest {
    pub code: String,
}

pub async fn check_reset_code(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    Json(body): Json<CheckResetCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;
    state
        .password_reset()
        .check_code(&project, &body.code)
        .await?;
    Ok(Json(CheckCodeResponse {
        is_code_valid: true,
    }))
}
