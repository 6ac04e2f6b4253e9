use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::handlers::CheckCodeResponse;
use crate::handlers::extract::ProjectId;
use crate::handlers::session::{BearerHeader, authenticate};
use crate::state::AppState;
use crate::usecase::email_verification::{SendVerificationCodeInput, SendVerificationCodeUseCase};

#[derive(Deserialize)]
pub struct SendVerificationCodeRequest {
    pub callback_url: String,
}

#[derive(Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

// ── POST /contact-channels/send-verification-code ─────────────────────────────

pub async fn send_verification_code(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    bearer: Option<BearerHeader>,
    Json(body): Json<SendVerificationCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let identity = authenticate(&state, project_id, bearer)?;
    let project = state.project(project_id).await?;

    let uc = SendVerificationCodeUseCase {
        users: state.user_repo(),
        verification: state.email_verification(),
    };
    uc.execute(
        &project,
        SendVerificationCodeInput {
            user_id: identity.user_id,
            callback_url: body.callback_url,
        },
    )
    .await?;

    Ok(StatusCode::ACCEPTED)
}

// ── POST /contact-channels/verify ─────────────────────────────────────────────

pub async fn verify_email(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    Json(body): Json<CodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;
    let verified = state
        .email_verification()
        .consume_code(&project, &body.code, ())
        .await?;
    Ok(Json(verified))
}

// ── POST /contact-channels/verify/check-code ──────────────────────────────────

pub async fn check_verification_code(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    Json(body): Json<CodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;
    state
        .email_verification()
        .check_code(&project, &body.code)
        .await?;
    Ok(Json(CheckCodeResponse {
        is_code_valid: true,
    }))
}
