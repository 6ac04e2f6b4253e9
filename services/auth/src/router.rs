use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use latchkey_core::health::{healthz, readiness};
use latchkey_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    email_verification::{check_verification_code, send_verification_code, verify_email},
    password_reset::{check_reset_code, reset_password, send_reset_code},
    session::{current_session, refresh_session, revoke_session},
    signup::sign_up,
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness("database", state.db.ping().await)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Password
        .route("/auth/password/sign-up", post(sign_up))
        .route("/auth/password/send-reset-code", post(send_reset_code))
        .route("/auth/password/reset", post(reset_password))
        .route("/auth/password/reset/check-code", post(check_reset_code))
        // Contact channels
        .route(
            "/contact-channels/send-verification-code",
            post(send_verification_code),
        )
        .route("/contact-channels/verify", post(verify_email))
        .route(
            "/contact-channels/verify/check-code",
            post(check_verification_code),
        )
        // Sessions
        .route(
            "/auth/sessions/current",
            get(current_session).delete(revoke_session),
        )
        .route("/auth/sessions/current/refresh", post(refresh_session))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
