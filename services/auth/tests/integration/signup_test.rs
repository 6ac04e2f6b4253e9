use latchkey_auth::error::AuthServiceError;
use latchkey_auth::usecase::email_verification::EMAIL_VERIFICATION_REQUESTED;
use latchkey_auth::usecase::signup::{SignUpInput, SignUpUseCase};

use crate::helpers::{
    MockCodeRepo, MockHasher, MockOutboxRepo, MockRefreshTokenRepo, MockUserRepo,
    TEST_CALLBACK_URL, email_verification, sessions, test_project,
};

type TestSignUp =
    SignUpUseCase<MockUserRepo, MockOutboxRepo, MockCodeRepo, MockRefreshTokenRepo, MockHasher>;

struct Fixture {
    users: MockUserRepo,
    outbox: MockOutboxRepo,
    codes: MockCodeRepo,
    tokens: MockRefreshTokenRepo,
}

impl Fixture {
    fn new() -> Self {
        Self {
            users: MockUserRepo::empty(),
            outbox: MockOutboxRepo::empty(),
            codes: MockCodeRepo::empty(),
            tokens: MockRefreshTokenRepo::empty(),
        }
    }

    fn uc(&self) -> TestSignUp {
        SignUpUseCase {
            users: self.users.clone(),
            hasher: MockHasher,
            verification: email_verification(
                self.users.clone(),
                self.outbox.clone(),
                self.codes.clone(),
            ),
            sessions: sessions(self.tokens.clone()),
        }
    }
}

fn input(email: &str, password: &str) -> SignUpInput {
    SignUpInput {
        email: email.to_owned(),
        password: password.to_owned(),
        verification_callback_url: TEST_CALLBACK_URL.to_owned(),
    }
}

#[tokio::test]
async fn should_sign_up_and_start_session() {
    let project = test_project();
    let fx = Fixture::new();

    let output = fx
        .uc()
        .execute(&project, input("New@Example.com", "correct-horse"))
        .await
        .unwrap();

    let user = fx.users.get(output.user_id).unwrap();
    assert_eq!(user.primary_email, "new@example.com");
    assert!(!user.primary_email_verified);
    assert_eq!(user.password_hash.as_deref(), Some("hashed:correct-horse"));

    assert_eq!(fx.codes.len(), 1, "expected a verification code");
    let events = fx.outbox.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EMAIL_VERIFICATION_REQUESTED);
    assert_eq!(events[0].payload["template"], "welcome");

    assert_eq!(fx.tokens.len(), 1, "expected a stored refresh token");
    let identity = fx
        .uc()
        .sessions
        .verify_access_token(&output.access_token)
        .unwrap();
    assert_eq!(identity.user_id, output.user_id);
    assert_eq!(identity.project_id, project.id);
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let project = test_project();
    let fx = Fixture::new();

    fx.uc()
        .execute(&project, input("dup@example.com", "password-one"))
        .await
        .unwrap();
    let result = fx
        .uc()
        .execute(&project, input(" DUP@example.com", "password-two"))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
    assert_eq!(fx.tokens.len(), 1);
}

#[tokio::test]
async fn should_allow_same_email_in_another_project() {
    let fx = Fixture::new();

    fx.uc()
        .execute(&test_project(), input("shared@example.com", "password-one"))
        .await
        .unwrap();

    let mut other = crate::helpers::other_project();
    other.allowed_domains.push("example.com".to_owned());
    fx.uc()
        .execute(&other, input("shared@example.com", "password-two"))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reject_sign_up_when_password_auth_disabled() {
    let mut project = test_project();
    project.credential_enabled = false;
    let fx = Fixture::new();

    let result = fx
        .uc()
        .execute(&project, input("a@example.com", "correct-horse"))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::PasswordAuthNotEnabled)),
        "expected PasswordAuthNotEnabled, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_weak_password_without_creating_user() {
    let project = test_project();
    let fx = Fixture::new();

    let result = fx.uc().execute(&project, input("a@example.com", "short")).await;

    assert!(
        matches!(result, Err(AuthServiceError::WeakPassword(_))),
        "expected WeakPassword, got {result:?}"
    );
    assert!(fx.users.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_disallowed_callback_without_creating_user() {
    let project = test_project();
    let fx = Fixture::new();

    let mut bad = input("a@example.com", "correct-horse");
    bad.verification_callback_url = "https://evil.test/verify".to_owned();
    let result = fx.uc().execute(&project, bad).await;

    assert!(
        matches!(result, Err(AuthServiceError::RedirectUrlNotAllowed)),
        "expected RedirectUrlNotAllowed, got {result:?}"
    );
    assert!(fx.users.users.lock().unwrap().is_empty());
}
