//! Stateless JWT access tokens scoped to a project.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity carried by a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub access_token_exp: u64,
}

/// Errors from validating or issuing an access token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token lifetime of {0}s is out of range")]
    TtlOutOfRange(u64),
}

/// JWT claims of an access token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (UUID string) |
/// | `project_id` | custom | tenant the user belongs to |
/// | `iat` | `iat` | issued at, seconds since epoch |
/// | `exp` | `exp` | expiry, seconds since epoch |
/// | `jti` | `jti` | random id; two tokens minted in the same second still differ |
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub project_id: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

#[cfg(any(feature = "issue", test))]
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// HS256 with `exp` enforced and no leeway: an access token is dead the
/// second its `exp` passes.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Validate an access token, returning the identity it carries.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, TokenError> {
    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    let claims = data.claims;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    let project_id = claims
        .project_id
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(TokenInfo {
        project_id,
        user_id,
        access_token_exp: claims.exp,
    })
}

/// Mint an access token for `user_id` in `project_id`, valid for `ttl_secs`.
/// Returns the token and its `exp`.
#[cfg(any(feature = "issue", test))]
pub fn issue_access_token(
    project_id: Uuid,
    user_id: Uuid,
    ttl_secs: u64,
    secret: &str,
) -> Result<(String, u64), TokenError> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let iat = now_secs();
    let exp = iat
        .checked_add(ttl_secs)
        .ok_or(TokenError::TtlOutOfRange(ttl_secs))?;
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        project_id: project_id.to_string(),
        iat,
        exp,
        jti: Uuid::new_v4().simple().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)?;
    Ok((token, exp))
}
