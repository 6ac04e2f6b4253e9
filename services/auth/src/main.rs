use sea_orm::Database;
use tracing::info;

use latchkey_auth::config::AuthConfig;
use latchkey_auth::router::build_router;
use latchkey_auth::state::AppState;
use latchkey_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let verification_code_ttl = chrono::Duration::try_seconds(config.verification_code_ttl_secs)
        .filter(|ttl| *ttl >= chrono::Duration::zero())
        .expect("VERIFICATION_CODE_TTL_SECS out of range");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        access_token_ttl_secs: config.access_token_ttl_secs,
        verification_code_ttl,
        bcrypt_cost: config.bcrypt_cost,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
