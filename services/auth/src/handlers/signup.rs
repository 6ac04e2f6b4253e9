use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::handlers::extract::ProjectId;
use crate::state::AppState;
use crate::usecase::signup::{SignUpInput, SignUpUseCase};

// ── POST /auth/password/sign-up ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub verification_callback_url: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    Json(body): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let project = state.project(project_id).await?;

    let uc = SignUpUseCase {
        users: state.user_repo(),
        hasher: state.password_hasher(),
        verification: state.email_verification(),
        sessions: state.sessions(),
    };
    let output = uc
        .execute(
            &project,
            SignUpInput {
                email: body.email,
                password: body.password,
                verification_callback_url: body.verification_callback_url,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(output)))
}
