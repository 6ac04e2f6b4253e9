use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::domain::repository::ProjectRepository;
use crate::domain::types::Project;
use crate::error::AuthServiceError;
use crate::infra::db::{
    DbOutboxRepository, DbProjectRepository, DbRefreshTokenRepository, DbUserRepository,
    DbVerificationCodeRepository,
};
use crate::infra::password::BcryptPasswordHasher;
use crate::usecase::email_verification::{EmailVerificationHandler, EmailVerificationWorkflow};
use crate::usecase::password_reset::{PasswordResetHandler, PasswordResetWorkflow};
use crate::usecase::session::TokenPairManager;
use crate::usecase::verification::VerificationCodeHandler;

pub type DbEmailVerificationHandler =
    EmailVerificationHandler<DbUserRepository, DbOutboxRepository, DbVerificationCodeRepository>;

pub type DbPasswordResetHandler = PasswordResetHandler<
    DbUserRepository,
    DbOutboxRepository,
    BcryptPasswordHasher,
    DbVerificationCodeRepository,
>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub verification_code_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn project_repo(&self) -> DbProjectRepository {
        DbProjectRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn refresh_token_repo(&self) -> DbRefreshTokenRepository {
        DbRefreshTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn outbox_repo(&self) -> DbOutboxRepository {
        DbOutboxRepository {
            db: self.db.clone(),
        }
    }

    pub fn password_hasher(&self) -> BcryptPasswordHasher {
        BcryptPasswordHasher {
            cost: self.bcrypt_cost,
        }
    }

    pub fn sessions(&self) -> TokenPairManager<DbRefreshTokenRepository> {
        TokenPairManager::new(self.refresh_token_repo(), self.jwt_secret.clone())
            .with_access_token_ttl(self.access_token_ttl_secs)
    }

    pub fn email_verification(&self) -> DbEmailVerificationHandler {
        let workflow = EmailVerificationWorkflow {
            users: self.user_repo(),
            outbox: self.outbox_repo(),
        };
        VerificationCodeHandler::new(workflow, self.verification_code_repo())
            .with_default_ttl(self.verification_code_ttl)
    }

    pub fn password_reset(&self) -> DbPasswordResetHandler {
        let workflow = PasswordResetWorkflow {
            users: self.user_repo(),
            outbox: self.outbox_repo(),
            hasher: self.password_hasher(),
        };
        VerificationCodeHandler::new(workflow, self.verification_code_repo())
            .with_default_ttl(self.verification_code_ttl)
    }

    /// Load the tenant named by the request, or `ProjectNotFound`.
    pub async fn project(&self, project_id: Uuid) -> Result<Project, AuthServiceError> {
        self.project_repo()
            .find_by_id(project_id)
            .await?
            .ok_or(AuthServiceError::ProjectNotFound)
    }
}
