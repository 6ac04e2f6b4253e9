use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use latchkey_auth::domain::repository::{
    OutboxRepository, PasswordHasher, RefreshTokenRepository, UserRepository,
    VerificationCodeRepository,
};
use latchkey_auth::domain::types::{
    OutboxEvent, Project, RefreshTokenRecord, User, VerificationCode,
};
use latchkey_auth::error::AuthServiceError;
use latchkey_auth::usecase::email_verification::{
    EmailVerificationHandler, EmailVerificationWorkflow,
};
use latchkey_auth::usecase::password_reset::{PasswordResetHandler, PasswordResetWorkflow};
use latchkey_auth::usecase::session::TokenPairManager;
use latchkey_auth::usecase::verification::VerificationCodeHandler;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

impl UserRepository for MockUserRepo {
    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.project_id == user.project_id && u.primary_email == user.primary_email)
        {
            return Err(AuthServiceError::UserAlreadyExists);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.project_id == project_id && u.id == id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        project_id: Uuid,
        email: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.project_id == project_id && u.primary_email == email)
            .cloned())
    }

    async fn mark_email_verified(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        email: &str,
    ) -> Result<bool, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| {
            u.project_id == project_id && u.id == user_id && u.primary_email == email
        }) {
            Some(user) => {
                user.primary_email_verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password_hash(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.project_id == project_id && u.id == user_id)
        {
            Some(user) => {
                user.password_hash = Some(password_hash.to_owned());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCodeRepo {
    pub codes: Arc<Mutex<Vec<VerificationCode>>>,
}

impl MockCodeRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&self, code: VerificationCode) {
        self.codes.lock().unwrap().push(code);
    }

    pub fn get(&self, code: &str) -> Option<VerificationCode> {
        self.codes.lock().unwrap().iter().find(|c| c.code == code).cloned()
    }

    pub fn len(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

impl VerificationCodeRepository for MockCodeRepo {
    async fn create(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn find(
        &self,
        project_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.project_id == project_id && c.code == code)
            .cloned())
    }

    // Check and set under one lock, like the conditional UPDATE.
    async fn mark_used(
        &self,
        project_id: Uuid,
        code: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        let mut codes = self.codes.lock().unwrap();
        match codes
            .iter_mut()
            .find(|c| c.project_id == project_id && c.code == code && c.used_at.is_none())
        {
            Some(c) => {
                c.used_at = Some(used_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── YieldingCodeRepo ─────────────────────────────────────────────────────────

/// Code store that yields after every read, so concurrent consumers all see
/// the unused row before any of them writes. Counts `mark_used` calls.
#[derive(Clone, Default)]
pub struct YieldingCodeRepo {
    pub inner: MockCodeRepo,
    pub mark_used_calls: Arc<AtomicUsize>,
}

impl YieldingCodeRepo {
    pub fn mark_used_calls(&self) -> usize {
        self.mark_used_calls.load(Ordering::SeqCst)
    }
}

impl VerificationCodeRepository for YieldingCodeRepo {
    async fn create(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        self.inner.create(code).await
    }

    async fn find(
        &self,
        project_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        let found = self.inner.find(project_id, code).await;
        tokio::task::yield_now().await;
        found
    }

    async fn mark_used(
        &self,
        project_id: Uuid,
        code: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        self.mark_used_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_used(project_id, code, used_at).await
    }
}

// ── MockRefreshTokenRepo ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockRefreshTokenRepo {
    pub tokens: Arc<Mutex<Vec<RefreshTokenRecord>>>,
}

impl MockRefreshTokenRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

impl RefreshTokenRepository for MockRefreshTokenRepo {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        self.tokens.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.project_id == project_id && t.refresh_token == refresh_token)
            .cloned())
    }

    async fn delete(
        &self,
        project_id: Uuid,
        refresh_token: &str,
    ) -> Result<bool, AuthServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| !(t.project_id == project_id && t.refresh_token == refresh_token));
        Ok(tokens.len() < before)
    }
}

// ── MockOutboxRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOutboxRepo {
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
    pub fail: Arc<AtomicBool>,
}

impl MockOutboxRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    /// An outbox whose every enqueue fails.
    pub fn failing() -> Self {
        let outbox = Self::default();
        outbox.fail.store(true, Ordering::SeqCst);
        outbox
    }

    pub fn events(&self) -> Vec<OutboxEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl OutboxRepository for MockOutboxRepo {
    async fn enqueue(&self, event: &OutboxEvent) -> Result<(), AuthServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthServiceError::Internal(anyhow::anyhow!(
                "outbox unavailable"
            )));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ── MockHasher ───────────────────────────────────────────────────────────────

/// Reversible stand-in for bcrypt so tests can read the stored password.
#[derive(Clone, Default)]
pub struct MockHasher;

impl PasswordHasher for MockHasher {
    async fn hash(&self, password: &str) -> Result<String, AuthServiceError> {
        Ok(format!("hashed:{password}"))
    }
}

// ── Builders ─────────────────────────────────────────────────────────────────

pub fn email_verification(
    users: MockUserRepo,
    outbox: MockOutboxRepo,
    codes: MockCodeRepo,
) -> EmailVerificationHandler<MockUserRepo, MockOutboxRepo, MockCodeRepo> {
    VerificationCodeHandler::new(EmailVerificationWorkflow { users, outbox }, codes)
}

pub fn password_reset(
    users: MockUserRepo,
    outbox: MockOutboxRepo,
    codes: MockCodeRepo,
) -> PasswordResetHandler<MockUserRepo, MockOutboxRepo, MockHasher, MockCodeRepo> {
    VerificationCodeHandler::new(
        PasswordResetWorkflow {
            users,
            outbox,
            hasher: MockHasher,
        },
        codes,
    )
}

pub fn sessions(tokens: MockRefreshTokenRepo) -> TokenPairManager<MockRefreshTokenRepo> {
    TokenPairManager::new(tokens, TEST_JWT_SECRET.to_owned())
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_project() -> Project {
    Project {
        id: Uuid::parse_str("00000000-0000-0000-0000-0000000000a1").unwrap(),
        display_name: "Acme".to_owned(),
        allowed_domains: vec!["example.com".to_owned()],
        allow_localhost: false,
        credential_enabled: true,
    }
}

pub fn other_project() -> Project {
    Project {
        id: Uuid::parse_str("00000000-0000-0000-0000-0000000000b2").unwrap(),
        display_name: "Other".to_owned(),
        allowed_domains: vec!["other.test".to_owned()],
        allow_localhost: true,
        credential_enabled: true,
    }
}

pub fn test_user(project_id: Uuid) -> User {
    User {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
        project_id,
        primary_email: "user@example.com".to_owned(),
        primary_email_verified: false,
        password_hash: Some("hashed:old-password".to_owned()),
        created_at: Utc::now(),
    }
}

pub const TEST_CALLBACK_URL: &str = "https://app.example.com/verify";

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";
