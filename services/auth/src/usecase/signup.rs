//! Email + password sign-up.

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::redirect;
use crate::domain::repository::{
    OutboxRepository, PasswordHasher, RefreshTokenRepository, UserRepository,
    VerificationCodeRepository,
};
use crate::domain::types::{Project, User};
use crate::error::AuthServiceError;
use crate::usecase::email_verification::{
    EmailVerificationHandler, EmailVerificationPayload, VerificationMailTemplate,
};
use crate::usecase::password::{check_password_strength, normalize_email};
use crate::usecase::session::TokenPairManager;
use crate::usecase::verification::CreateCodeOptions;

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub verification_callback_url: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpOutput {
    pub user_id: Uuid,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct SignUpUseCase<U, O, C, R, H>
where
    U: UserRepository,
    O: OutboxRepository,
    C: VerificationCodeRepository,
    R: RefreshTokenRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub hasher: H,
    pub verification: EmailVerificationHandler<U, O, C>,
    pub sessions: TokenPairManager<R>,
}

impl<U, O, C, R, H> SignUpUseCase<U, O, C, R, H>
where
    U: UserRepository,
    O: OutboxRepository,
    C: VerificationCodeRepository,
    R: RefreshTokenRepository,
    H: PasswordHasher,
{
    pub async fn execute(
        &self,
        project: &Project,
        input: SignUpInput,
    ) -> Result<SignUpOutput, AuthServiceError> {
        // 1. Project must allow password sign-up
        if !project.credential_enabled {
            return Err(AuthServiceError::PasswordAuthNotEnabled);
        }

        // 2. Reject bad input before anything is written
        check_password_strength(&input.password)?;
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(AuthServiceError::InvalidPayload(
                "email must not be empty".to_owned(),
            ));
        }
        if !redirect::is_allowed(
            &input.verification_callback_url,
            &project.allowed_domains,
            project.allow_localhost,
        ) {
            return Err(AuthServiceError::RedirectUrlNotAllowed);
        }

        // 3. Insert guarded by the (project_id, primary_email) unique constraint
        let password_hash = self.hasher.hash(&input.password).await?;
        let user = User {
            id: Uuid::now_v7(),
            project_id: project.id,
            primary_email: email.clone(),
            primary_email_verified: false,
            password_hash: Some(password_hash),
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;
        info!(project_id = %project.id, user_id = %user.id, "user signed up");

        // 4. Verification mail
        let options = CreateCodeOptions {
            project: project.clone(),
            email,
            payload: EmailVerificationPayload { user_id: user.id },
            callback_url: input.verification_callback_url,
            expires_in: None,
        };
        self.verification
            .send_code(&options, VerificationMailTemplate::Welcome)
            .await?;

        // 5. Session
        let pair = self.sessions.issue_token_pair(project.id, user.id).await?;

        Ok(SignUpOutput {
            user_id: user.id,
            access_token: pair.access_token,
            access_token_exp: pair.access_token_exp,
            refresh_token: pair.refresh_token,
        })
    }
}
