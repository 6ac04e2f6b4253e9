#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{OutboxEvent, Project, RefreshTokenRecord, User, VerificationCode};
use crate::error::AuthServiceError;

/// Tenant lookup.
pub trait ProjectRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, AuthServiceError>;
}

/// Project users.
pub trait UserRepository: Send + Sync {
    /// Insert a user. The `(project_id, primary_email)` uniqueness constraint
    /// decides conflicts: a duplicate yields `UserAlreadyExists`.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    async fn find_by_id(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_email(
        &self,
        project_id: Uuid,
        email: &str,
    ) -> Result<Option<User>, AuthServiceError>;

    /// Mark `email` verified for the user, provided it is still their primary
    /// email. Returns `false` if no such user/email pair exists.
    async fn mark_email_verified(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        email: &str,
    ) -> Result<bool, AuthServiceError>;

    /// Replace the password hash. Returns `false` if the user does not exist.
    async fn update_password_hash(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AuthServiceError>;
}

/// Verification code store.
pub trait VerificationCodeRepository: Send + Sync {
    async fn create(&self, code: &VerificationCode) -> Result<(), AuthServiceError>;

    async fn find(
        &self,
        project_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError>;

    /// Conditionally set `used_at` where it is still null.
    /// Returns `true` only if this call performed the transition.
    async fn mark_used(
        &self,
        project_id: Uuid,
        code: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError>;
}

/// Persisted refresh tokens.
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError>;

    async fn find(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError>;

    /// Delete a refresh token. Returns `true` if deleted, `false` if not found.
    async fn delete(&self, project_id: Uuid, refresh_token: &str)
    -> Result<bool, AuthServiceError>;
}

/// Outbox for mails picked up by the delivery worker.
pub trait OutboxRepository: Send + Sync {
    async fn enqueue(&self, event: &OutboxEvent) -> Result<(), AuthServiceError>;
}

/// Password hashing collaborator.
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, AuthServiceError>;
}
