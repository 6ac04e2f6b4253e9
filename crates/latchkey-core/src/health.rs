use std::fmt::Display;

use axum::http::StatusCode;

/// Handler for `GET /healthz`. The process is up if it can answer.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map the outcome of a dependency probe (database ping, etc.) to the
/// `GET /readyz` status. Failures are logged with the probe name.
pub fn readiness<E: Display>(probe: &str, outcome: Result<(), E>) -> StatusCode {
    match outcome {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(probe, error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
