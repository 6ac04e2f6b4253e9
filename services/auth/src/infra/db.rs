use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use latchkey_auth_schema::{outbox_events, projects, refresh_tokens, users, verification_codes};

use crate::domain::repository::{
    OutboxRepository, ProjectRepository, RefreshTokenRepository, UserRepository,
    VerificationCodeRepository,
};
use crate::domain::types::{
    OutboxEvent, Project, RefreshTokenRecord, User, VerificationCode, VerificationCodeType,
};
use crate::error::AuthServiceError;

// ── Project repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProjectRepository {
    pub db: DatabaseConnection,
}

impl ProjectRepository for DbProjectRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, AuthServiceError> {
        let model = projects::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find project by id")?;
        model.map(project_from_model).transpose()
    }
}

fn project_from_model(model: projects::Model) -> Result<Project, AuthServiceError> {
    let allowed_domains: Vec<String> = serde_json::from_value(model.allowed_domains)
        .with_context(|| format!("decode allowed_domains of project {}", model.id))?;
    Ok(Project {
        id: model.id,
        display_name: model.display_name,
        allowed_domains,
        allow_localhost: model.allow_localhost,
        credential_enabled: model.credential_enabled,
    })
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            project_id: Set(user.project_id),
            primary_email: Set(user.primary_email.clone()),
            primary_email_verified: Set(user.primary_email_verified),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthServiceError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn find_by_id(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .filter(users::Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(
        &self,
        project_id: Uuid,
        email: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::ProjectId.eq(project_id))
            .filter(users::Column::PrimaryEmail.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn mark_email_verified(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        email: &str,
    ) -> Result<bool, AuthServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PrimaryEmailVerified, Expr::value(true))
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::ProjectId.eq(project_id))
            .filter(users::Column::PrimaryEmail.eq(email))
            .exec(&self.db)
            .await
            .context("mark email verified")?;
        Ok(result.rows_affected > 0)
    }

    async fn update_password_hash(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AuthServiceError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::PasswordHash,
                Expr::value(Some(password_hash.to_owned())),
            )
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::ProjectId.eq(project_id))
            .exec(&self.db)
            .await
            .context("update password hash")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        project_id: model.project_id,
        primary_email: model.primary_email,
        primary_email_verified: model.primary_email_verified,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── Verification code repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn create(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        verification_codes::ActiveModel {
            id: Set(code.id),
            project_id: Set(code.project_id),
            code: Set(code.code.clone()),
            kind: Set(code.kind.as_str().to_owned()),
            email: Set(code.email.clone()),
            payload: Set(code.payload.clone()),
            redirect_url: Set(code.redirect_url.clone()),
            created_at: Set(code.created_at),
            expires_at: Set(code.expires_at),
            used_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("create verification code")?;
        Ok(())
    }

    async fn find(
        &self,
        project_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::ProjectId.eq(project_id))
            .filter(verification_codes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find verification code")?;
        model.map(verification_code_from_model).transpose()
    }

    async fn mark_used(
        &self,
        project_id: Uuid,
        code: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        // UPDATE ... WHERE used_at IS NULL: the database serializes racing
        // consumers and only one sees a row affected.
        let result = verification_codes::Entity::update_many()
            .col_expr(verification_codes::Column::UsedAt, Expr::value(used_at))
            .filter(verification_codes::Column::ProjectId.eq(project_id))
            .filter(verification_codes::Column::Code.eq(code))
            .filter(verification_codes::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("mark verification code used")?;
        Ok(result.rows_affected == 1)
    }
}

fn verification_code_from_model(
    model: verification_codes::Model,
) -> Result<VerificationCode, AuthServiceError> {
    let kind = model
        .kind
        .parse::<VerificationCodeType>()
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("decode kind of verification code {}", model.id))?;
    Ok(VerificationCode {
        id: model.id,
        project_id: model.project_id,
        code: model.code,
        kind,
        email: model.email,
        payload: model.payload,
        redirect_url: model.redirect_url,
        created_at: model.created_at,
        expires_at: model.expires_at,
        used_at: model.used_at,
    })
}

// ── Refresh token repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRefreshTokenRepository {
    pub db: DatabaseConnection,
}

impl RefreshTokenRepository for DbRefreshTokenRepository {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        refresh_tokens::ActiveModel {
            id: Set(record.id),
            project_id: Set(record.project_id),
            refresh_token: Set(record.refresh_token.clone()),
            user_id: Set(record.user_id),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create refresh token")?;
        Ok(())
    }

    async fn find(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        let model = refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::ProjectId.eq(project_id))
            .filter(refresh_tokens::Column::RefreshToken.eq(refresh_token))
            .one(&self.db)
            .await
            .context("find refresh token")?;
        Ok(model.map(|model| RefreshTokenRecord {
            id: model.id,
            project_id: model.project_id,
            refresh_token: model.refresh_token,
            user_id: model.user_id,
            created_at: model.created_at,
        }))
    }

    async fn delete(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<bool, AuthServiceError> {
        let result = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::ProjectId.eq(project_id))
            .filter(refresh_tokens::Column::RefreshToken.eq(refresh_token))
            .exec(&self.db)
            .await
            .context("delete refresh token")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Outbox repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxRepository {
    pub db: DatabaseConnection,
}

impl OutboxRepository for DbOutboxRepository {
    async fn enqueue(&self, event: &OutboxEvent) -> Result<(), AuthServiceError> {
        let now = Utc::now();
        outbox_events::ActiveModel {
            id: Set(event.id),
            project_id: Set(event.project_id),
            kind: Set(event.kind.clone()),
            payload: Set(event.payload.clone()),
            idempotency_key: Set(event.idempotency_key.clone()),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now),
            next_attempt_at: Set(now),
            processed_at: Set(None),
            failed_at: Set(None),
        }
        .insert(&self.db)
        .await
        .with_context(|| format!("enqueue outbox event {}", event.kind))?;
        Ok(())
    }
}
