//! Generic verification-code engine.
//!
//! A [`VerificationWorkflow`] declares what a code carries and what happens
//! around it (delivery when sent, the business action when consumed). The
//! [`VerificationCodeHandler`] owns the lifecycle: create, send, check and
//! the one-shot consume.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::domain::redirect;
use crate::domain::repository::VerificationCodeRepository;
use crate::domain::types::{
    DEFAULT_VERIFICATION_CODE_TTL_SECS, Project, VERIFICATION_CODE_LEN, VerificationCode,
    VerificationCodeType,
};
use crate::error::AuthServiceError;
use crate::usecase::secret::generate_secure_string;

/// Query parameter carrying the code in generated links.
pub const CODE_QUERY_PARAM: &str = "code";

/// Data carried by a verification code.
///
/// The serde shape is the schema: payload types should use
/// `#[serde(deny_unknown_fields)]` so extra or missing fields are errors.
/// `validate` adds semantic checks on top.
pub trait CodePayload: Serialize + DeserializeOwned + Send + Sync {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// One kind of verification flow (email verification, password reset, ...).
#[allow(async_fn_in_trait)]
pub trait VerificationWorkflow: Send + Sync {
    /// Discriminator stored with each code. Codes are only redeemable by the
    /// workflow that created them.
    const TYPE: VerificationCodeType;

    type Payload: CodePayload;
    /// Extra options for `deliver`, supplied by the caller of `send_code`.
    type DeliverOptions;
    /// Extra request data passed through to `finalize`.
    type RequestData;
    /// What `finalize` returns; handed back to the consumer verbatim.
    type Output;

    async fn deliver(
        &self,
        code: &CodeObject,
        options: &CreateCodeOptions<Self::Payload>,
        deliver_options: Self::DeliverOptions,
    ) -> Result<(), AuthServiceError>;

    /// Business action run at most once, after the code has been marked used.
    async fn finalize(
        &self,
        project: &Project,
        email: &str,
        payload: Self::Payload,
        request: Self::RequestData,
    ) -> Result<Self::Output, AuthServiceError>;
}

pub struct CreateCodeOptions<P> {
    pub project: Project,
    pub email: String,
    pub payload: P,
    pub callback_url: String,
    /// Overrides the handler's default lifetime.
    pub expires_in: Option<Duration>,
}

/// A freshly created code and the link that carries it.
#[derive(Debug, Clone)]
pub struct CodeObject {
    pub id: Uuid,
    pub code: String,
    pub link: Url,
    pub expires_at: DateTime<Utc>,
}

pub struct VerificationCodeHandler<W, C>
where
    W: VerificationWorkflow,
    C: VerificationCodeRepository,
{
    pub workflow: W,
    pub codes: C,
    pub default_ttl: Duration,
}

impl<W, C> VerificationCodeHandler<W, C>
where
    W: VerificationWorkflow,
    C: VerificationCodeRepository,
{
    pub fn new(workflow: W, codes: C) -> Self {
        Self {
            workflow,
            codes,
            default_ttl: Duration::seconds(DEFAULT_VERIFICATION_CODE_TTL_SECS),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Persist a new code and build its link. Delivers nothing.
    pub async fn create_code(
        &self,
        options: &CreateCodeOptions<W::Payload>,
    ) -> Result<CodeObject, AuthServiceError> {
        if options.email.trim().is_empty() {
            return Err(AuthServiceError::InvalidPayload(
                "email must not be empty".to_owned(),
            ));
        }
        options
            .payload
            .validate()
            .map_err(AuthServiceError::InvalidPayload)?;
        let payload = serde_json::to_value(&options.payload)
            .map_err(|e| AuthServiceError::InvalidPayload(e.to_string()))?;

        let project = &options.project;
        if !redirect::is_allowed(
            &options.callback_url,
            &project.allowed_domains,
            project.allow_localhost,
        ) {
            return Err(AuthServiceError::RedirectUrlNotAllowed);
        }
        let mut link =
            Url::parse(&options.callback_url).map_err(|_| AuthServiceError::RedirectUrlNotAllowed)?;

        let ttl = options.expires_in.unwrap_or(self.default_ttl);
        if ttl < Duration::zero() {
            return Err(AuthServiceError::InvalidPayload(
                "expires_in must not be negative".to_owned(),
            ));
        }
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            AuthServiceError::InvalidPayload("expires_in out of range".to_owned())
        })?;
        let record = VerificationCode {
            id: Uuid::new_v4(),
            project_id: project.id,
            code: generate_secure_string(VERIFICATION_CODE_LEN),
            kind: W::TYPE,
            email: options.email.clone(),
            payload,
            redirect_url: options.callback_url.clone(),
            created_at: now,
            expires_at,
            used_at: None,
        };
        self.codes.create(&record).await?;

        set_code_param(&mut link, &record.code);
        debug!(
            project_id = %project.id,
            code_id = %record.id,
            kind = %W::TYPE,
            expires_at = %record.expires_at,
            "verification code created"
        );
        Ok(CodeObject {
            id: record.id,
            code: record.code,
            link,
            expires_at: record.expires_at,
        })
    }

    /// Create a code and hand its link to the workflow's delivery. A failed
    /// delivery is returned as-is; the code row stays and remains redeemable.
    pub async fn send_code(
        &self,
        options: &CreateCodeOptions<W::Payload>,
        deliver_options: W::DeliverOptions,
    ) -> Result<CodeObject, AuthServiceError> {
        let code = self.create_code(options).await?;
        self.workflow
            .deliver(&code, options, deliver_options)
            .await?;
        Ok(code)
    }

    /// Confirm a code is redeemable without consuming it.
    pub async fn check_code(&self, project: &Project, code: &str) -> Result<(), AuthServiceError> {
        let record = self.load_redeemable(project, code).await?;
        decode_payload::<W::Payload>(&record)?;
        Ok(())
    }

    /// Redeem a code once and run the workflow's `finalize`.
    ///
    /// The `used_at` transition is a single conditional write; of any number
    /// of concurrent consumers exactly one gets past it, the rest see
    /// `VerificationCodeAlreadyUsed`. `finalize` runs only after that write
    /// and a `finalize` failure does not give the code back.
    pub async fn consume_code(
        &self,
        project: &Project,
        code: &str,
        request: W::RequestData,
    ) -> Result<W::Output, AuthServiceError> {
        let record = self.load_redeemable(project, code).await?;

        if !self.codes.mark_used(project.id, code, Utc::now()).await? {
            return Err(AuthServiceError::VerificationCodeAlreadyUsed);
        }
        info!(
            project_id = %project.id,
            code_id = %record.id,
            kind = %W::TYPE,
            "verification code consumed"
        );

        let payload = decode_payload::<W::Payload>(&record)?;
        self.workflow
            .finalize(project, &record.email, payload, request)
            .await
    }

    /// Checks in a fixed order: not found, expired, already used.
    async fn load_redeemable(
        &self,
        project: &Project,
        code: &str,
    ) -> Result<VerificationCode, AuthServiceError> {
        let record = self
            .codes
            .find(project.id, code)
            .await?
            .filter(|record| record.kind == W::TYPE)
            .ok_or(AuthServiceError::VerificationCodeNotFound)?;
        if record.is_expired_at(Utc::now()) {
            return Err(AuthServiceError::VerificationCodeExpired);
        }
        if record.used_at.is_some() {
            return Err(AuthServiceError::VerificationCodeAlreadyUsed);
        }
        Ok(record)
    }
}

fn decode_payload<P: CodePayload>(record: &VerificationCode) -> Result<P, AuthServiceError> {
    let payload: P = serde_json::from_value(record.payload.clone())
        .map_err(|e| AuthServiceError::PayloadSchemaMismatch(format!("{}: {e}", record.kind)))?;
    payload
        .validate()
        .map_err(|e| AuthServiceError::PayloadSchemaMismatch(format!("{}: {e}", record.kind)))?;
    Ok(payload)
}

/// Set the `code` query parameter, replacing any existing one and keeping the
/// rest of the query intact.
fn set_code_param(link: &mut Url, code: &str) {
    let retained: Vec<(String, String)> = link
        .query_pairs()
        .filter(|(key, _)| key != CODE_QUERY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    link.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(CODE_QUERY_PARAM, code);
}
