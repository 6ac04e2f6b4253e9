//! Token pairs: stateless access tokens plus persisted refresh tokens.

use chrono::Utc;
use latchkey_token::token::{TokenError, issue_access_token, validate_access_token};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::repository::RefreshTokenRepository;
use crate::domain::types::{DEFAULT_ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_LEN, RefreshTokenRecord};
use crate::error::AuthServiceError;
use crate::usecase::secret::generate_secure_string;

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub access_token_exp: u64,
}

/// Identity proven by a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub project_id: Uuid,
    pub user_id: Uuid,
}

pub struct TokenPairManager<R: RefreshTokenRepository> {
    pub refresh_tokens: R,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
}

impl<R: RefreshTokenRepository> TokenPairManager<R> {
    pub fn new(refresh_tokens: R, jwt_secret: String) -> Self {
        Self {
            refresh_tokens,
            jwt_secret,
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
        }
    }

    pub fn with_access_token_ttl(mut self, secs: u64) -> Self {
        self.access_token_ttl_secs = secs;
        self
    }

    fn mint_access_token(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<AccessToken, AuthServiceError> {
        let (access_token, access_token_exp) = issue_access_token(
            project_id,
            user_id,
            self.access_token_ttl_secs,
            &self.jwt_secret,
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok(AccessToken {
            access_token,
            access_token_exp,
        })
    }

    /// Persist a new refresh token for the user and mint an access token.
    pub async fn issue_token_pair(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<TokenPair, AuthServiceError> {
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            project_id,
            refresh_token: generate_secure_string(REFRESH_TOKEN_LEN),
            user_id,
            created_at: Utc::now(),
        };
        self.refresh_tokens.create(&record).await?;

        let access = self.mint_access_token(project_id, user_id)?;
        info!(%project_id, %user_id, session_id = %record.id, "session created");
        Ok(TokenPair {
            access_token: access.access_token,
            access_token_exp: access.access_token_exp,
            refresh_token: record.refresh_token,
        })
    }

    /// Mint a new access token from a stored refresh token. The refresh token
    /// itself is not rotated.
    pub async fn refresh_access_token(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<AccessToken, AuthServiceError> {
        let record = self
            .refresh_tokens
            .find(project_id, refresh_token)
            .await?
            .ok_or(AuthServiceError::RefreshTokenNotFound)?;
        self.mint_access_token(record.project_id, record.user_id)
    }

    /// Delete a stored refresh token. Access tokens already minted from it
    /// stay valid until they expire.
    pub async fn revoke_refresh_token(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AuthServiceError> {
        if !self.refresh_tokens.delete(project_id, refresh_token).await? {
            return Err(AuthServiceError::RefreshTokenNotFound);
        }
        info!(%project_id, "session revoked");
        Ok(())
    }

    /// Stateless check of signature and expiry; no store lookup.
    pub fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<SessionIdentity, AuthServiceError> {
        verify_access_token(access_token, &self.jwt_secret)
    }
}

/// Stateless access-token verification, usable without a refresh-token store.
pub fn verify_access_token(
    access_token: &str,
    jwt_secret: &str,
) -> Result<SessionIdentity, AuthServiceError> {
    let info = validate_access_token(access_token, jwt_secret).map_err(|e| match e {
        TokenError::Expired => AuthServiceError::AccessTokenExpired,
        _ => AuthServiceError::AccessTokenInvalid,
    })?;
    Ok(SessionIdentity {
        project_id: info.project_id,
        user_id: info.user_id,
    })
}
