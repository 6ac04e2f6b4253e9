//! Email verification: prove control of a user's primary email.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{OutboxRepository, UserRepository, VerificationCodeRepository};
use crate::domain::types::{OutboxEvent, Project, VerificationCodeType};
use crate::error::AuthServiceError;
use crate::usecase::verification::{
    CodeObject, CodePayload, CreateCodeOptions, VerificationCodeHandler, VerificationWorkflow,
};

pub const EMAIL_VERIFICATION_REQUESTED: &str = "email_verification_requested";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailVerificationPayload {
    pub user_id: Uuid,
}

impl CodePayload for EmailVerificationPayload {
    fn validate(&self) -> Result<(), String> {
        if self.user_id.is_nil() {
            return Err("user_id must not be nil".to_owned());
        }
        Ok(())
    }
}

/// Which mail template the delivery worker renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMailTemplate {
    /// Sent right after sign-up.
    Welcome,
    /// Sent on explicit request.
    Reverify,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailVerified {
    pub user_id: Uuid,
}

pub struct EmailVerificationWorkflow<U, O>
where
    U: UserRepository,
    O: OutboxRepository,
{
    pub users: U,
    pub outbox: O,
}

impl<U, O> VerificationWorkflow for EmailVerificationWorkflow<U, O>
where
    U: UserRepository,
    O: OutboxRepository,
{
    const TYPE: VerificationCodeType = VerificationCodeType::EmailVerification;

    type Payload = EmailVerificationPayload;
    type DeliverOptions = VerificationMailTemplate;
    type RequestData = ();
    type Output = EmailVerified;

    async fn deliver(
        &self,
        code: &CodeObject,
        options: &CreateCodeOptions<EmailVerificationPayload>,
        template: VerificationMailTemplate,
    ) -> Result<(), AuthServiceError> {
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            project_id: options.project.id,
            kind: EMAIL_VERIFICATION_REQUESTED.to_owned(),
            payload: json!({
                "to": options.email,
                "project_display_name": options.project.display_name,
                "user_id": options.payload.user_id,
                "template": template,
                "link": code.link.as_str(),
                "expires_at": code.expires_at,
            }),
            idempotency_key: format!("{EMAIL_VERIFICATION_REQUESTED}:{}", code.id),
        };
        self.outbox.enqueue(&event).await
    }

    async fn finalize(
        &self,
        project: &Project,
        email: &str,
        payload: EmailVerificationPayload,
        _request: (),
    ) -> Result<EmailVerified, AuthServiceError> {
        // The address must still be the user's primary email; a changed email
        // must not be marked verified by a stale link.
        let verified = self
            .users
            .mark_email_verified(project.id, payload.user_id, email)
            .await?;
        if !verified {
            return Err(AuthServiceError::UserNotFound);
        }
        Ok(EmailVerified {
            user_id: payload.user_id,
        })
    }
}

pub type EmailVerificationHandler<U, O, C> =
    VerificationCodeHandler<EmailVerificationWorkflow<U, O>, C>;

// ── Resend ───────────────────────────────────────────────────────────────────

pub struct SendVerificationCodeInput {
    pub user_id: Uuid,
    pub callback_url: String,
}

/// Send a fresh verification link to a signed-in user's primary email.
pub struct SendVerificationCodeUseCase<U, O, C>
where
    U: UserRepository,
    O: OutboxRepository,
    C: VerificationCodeRepository,
{
    pub users: U,
    pub verification: EmailVerificationHandler<U, O, C>,
}

impl<U, O, C> SendVerificationCodeUseCase<U, O, C>
where
    U: UserRepository,
    O: OutboxRepository,
    C: VerificationCodeRepository,
{
    pub async fn execute(
        &self,
        project: &Project,
        input: SendVerificationCodeInput,
    ) -> Result<(), AuthServiceError> {
        let user = self
            .users
            .find_by_id(project.id, input.user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let options = CreateCodeOptions {
            project: project.clone(),
            email: user.primary_email,
            payload: EmailVerificationPayload { user_id: user.id },
            callback_url: input.callback_url,
            expires_in: None,
        };
        self.verification
            .send_code(&options, VerificationMailTemplate::Reverify)
            .await?;
        Ok(())
    }
}
