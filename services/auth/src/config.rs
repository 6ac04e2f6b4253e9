use crate::domain::types::{DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_VERIFICATION_CODE_TTL_SECS};

/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Access token lifetime. Env var: `ACCESS_TOKEN_TTL_SECS`.
    pub access_token_ttl_secs: u64,
    /// Default verification code lifetime. Env var: `VERIFICATION_CODE_TTL_SECS`.
    pub verification_code_ttl_secs: i64,
    /// bcrypt work factor. Env var: `BCRYPT_COST`.
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            auth_port: env_or("AUTH_PORT", 3112),
            access_token_ttl_secs: env_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS),
            verification_code_ttl_secs: env_or(
                "VERIFICATION_CODE_TTL_SECS",
                DEFAULT_VERIFICATION_CODE_TTL_SECS,
            ),
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
