//! Password reset via an emailed one-time link.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::repository::{
    OutboxRepository, PasswordHasher, UserRepository, VerificationCodeRepository,
};
use crate::domain::types::{OutboxEvent, Project, VerificationCodeType};
use crate::error::AuthServiceError;
use crate::usecase::password::{check_password_strength, normalize_email};
use crate::usecase::verification::{
    CodeObject, CodePayload, CreateCodeOptions, VerificationCodeHandler, VerificationWorkflow,
};

pub const PASSWORD_RESET_REQUESTED: &str = "password_reset_requested";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetPayload {
    pub user_id: Uuid,
}

impl CodePayload for PasswordResetPayload {
    fn validate(&self) -> Result<(), String> {
        if self.user_id.is_nil() {
            return Err("user_id must not be nil".to_owned());
        }
        Ok(())
    }
}

pub struct NewPassword {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChanged {
    pub user_id: Uuid,
}

pub struct PasswordResetWorkflow<U, O, H>
where
    U: UserRepository,
    O: OutboxRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub outbox: O,
    pub hasher: H,
}

impl<U, O, H> VerificationWorkflow for PasswordResetWorkflow<U, O, H>
where
    U: UserRepository,
    O: OutboxRepository,
    H: PasswordHasher,
{
    const TYPE: VerificationCodeType = VerificationCodeType::PasswordReset;

    type Payload = PasswordResetPayload;
    type DeliverOptions = ();
    type RequestData = NewPassword;
    type Output = PasswordChanged;

    async fn deliver(
        &self,
        code: &CodeObject,
        options: &CreateCodeOptions<PasswordResetPayload>,
        _deliver_options: (),
    ) -> Result<(), AuthServiceError> {
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            project_id: options.project.id,
            kind: PASSWORD_RESET_REQUESTED.to_owned(),
            payload: json!({
                "to": options.email,
                "project_display_name": options.project.display_name,
                "user_id": options.payload.user_id,
                "link": code.link.as_str(),
                "expires_at": code.expires_at,
            }),
            idempotency_key: format!("{PASSWORD_RESET_REQUESTED}:{}", code.id),
        };
        self.outbox.enqueue(&event).await
    }

    async fn finalize(
        &self,
        project: &Project,
        _email: &str,
        payload: PasswordResetPayload,
        request: NewPassword,
    ) -> Result<PasswordChanged, AuthServiceError> {
        check_password_strength(&request.password)?;
        let hash = self.hasher.hash(&request.password).await?;
        let updated = self
            .users
            .update_password_hash(project.id, payload.user_id, &hash)
            .await?;
        if !updated {
            return Err(AuthServiceError::UserNotFound);
        }
        Ok(PasswordChanged {
            user_id: payload.user_id,
        })
    }
}

pub type PasswordResetHandler<U, O, H, C> =
    VerificationCodeHandler<PasswordResetWorkflow<U, O, H>, C>;

// ── Send reset code ──────────────────────────────────────────────────────────

pub struct SendResetCodeInput {
    pub email: String,
    pub callback_url: String,
}

pub struct SendResetCodeUseCase<U, O, H, C>
where
    U: UserRepository,
    O: OutboxRepository,
    H: PasswordHasher,
    C: VerificationCodeRepository,
{
    pub users: U,
    pub reset: PasswordResetHandler<U, O, H, C>,
}

impl<U, O, H, C> SendResetCodeUseCase<U, O, H, C>
where
    U: UserRepository,
    O: OutboxRepository,
    H: PasswordHasher,
    C: VerificationCodeRepository,
{
    /// Unknown emails succeed silently so the endpoint cannot be used to
    /// probe which addresses have accounts. The callback URL is still
    /// validated for every request.
    pub async fn execute(
        &self,
        project: &Project,
        input: SendResetCodeInput,
    ) -> Result<(), AuthServiceError> {
        if !crate::domain::redirect::is_allowed(
            &input.callback_url,
            &project.allowed_domains,
            project.allow_localhost,
        ) {
            return Err(AuthServiceError::RedirectUrlNotAllowed);
        }

        let email = normalize_email(&input.email);
        let Some(user) = self.users.find_by_email(project.id, &email).await? else {
            debug!(project_id = %project.id, "password reset requested for unknown email");
            return Ok(());
        };

        let options = CreateCodeOptions {
            project: project.clone(),
            email: user.primary_email,
            payload: PasswordResetPayload { user_id: user.id },
            callback_url: input.callback_url,
            expires_in: None,
        };
        self.reset.send_code(&options, ()).await?;
        Ok(())
    }
}

// ── Reset ────────────────────────────────────────────────────────────────────

pub struct ResetPasswordUseCase<U, O, H, C>
where
    U: UserRepository,
    O: OutboxRepository,
    H: PasswordHasher,
    C: VerificationCodeRepository,
{
    pub reset: PasswordResetHandler<U, O, H, C>,
}

impl<U, O, H, C> ResetPasswordUseCase<U, O, H, C>
where
    U: UserRepository,
    O: OutboxRepository,
    H: PasswordHasher,
    C: VerificationCodeRepository,
{
    /// The password is checked before the code is consumed so a rejected
    /// password does not burn the link.
    pub async fn execute(
        &self,
        project: &Project,
        code: &str,
        password: String,
    ) -> Result<PasswordChanged, AuthServiceError> {
        check_password_strength(&password)?;
        self.reset
            .consume_code(project, code, NewPassword { password })
            .await
    }
}
