use latchkey_auth::error::AuthServiceError;
use latchkey_auth::usecase::password_reset::{
    PASSWORD_RESET_REQUESTED, ResetPasswordUseCase, SendResetCodeInput, SendResetCodeUseCase,
};

use crate::helpers::{
    MockCodeRepo, MockOutboxRepo, MockUserRepo, TEST_CALLBACK_URL, password_reset, test_project,
    test_user,
};

struct Fixture {
    users: MockUserRepo,
    outbox: MockOutboxRepo,
    codes: MockCodeRepo,
}

impl Fixture {
    fn new() -> Self {
        Self {
            users: MockUserRepo::new(vec![test_user(test_project().id)]),
            outbox: MockOutboxRepo::empty(),
            codes: MockCodeRepo::empty(),
        }
    }

    fn send_uc(
        &self,
    ) -> SendResetCodeUseCase<MockUserRepo, MockOutboxRepo, crate::helpers::MockHasher, MockCodeRepo>
    {
        SendResetCodeUseCase {
            users: self.users.clone(),
            reset: password_reset(self.users.clone(), self.outbox.clone(), self.codes.clone()),
        }
    }

    fn reset_uc(
        &self,
    ) -> ResetPasswordUseCase<MockUserRepo, MockOutboxRepo, crate::helpers::MockHasher, MockCodeRepo>
    {
        ResetPasswordUseCase {
            reset: password_reset(self.users.clone(), self.outbox.clone(), self.codes.clone()),
        }
    }

    fn only_code(&self) -> String {
        self.codes.codes.lock().unwrap()[0].code.clone()
    }
}

fn send_input(email: &str, callback_url: &str) -> SendResetCodeInput {
    SendResetCodeInput {
        email: email.to_owned(),
        callback_url: callback_url.to_owned(),
    }
}

#[tokio::test]
async fn should_reset_password_with_emailed_code() {
    let project = test_project();
    let user = test_user(project.id);
    let fx = Fixture::new();

    fx.send_uc()
        .execute(&project, send_input("  User@Example.com ", TEST_CALLBACK_URL))
        .await
        .unwrap();

    let events = fx.outbox.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, PASSWORD_RESET_REQUESTED);

    let code = fx.only_code();
    let changed = fx
        .reset_uc()
        .execute(&project, &code, "a-new-password".to_owned())
        .await
        .unwrap();

    assert_eq!(changed.user_id, user.id);
    assert_eq!(
        fx.users.get(user.id).unwrap().password_hash.as_deref(),
        Some("hashed:a-new-password")
    );

    let again = fx
        .reset_uc()
        .execute(&project, &code, "another-password".to_owned())
        .await;
    assert!(
        matches!(again, Err(AuthServiceError::VerificationCodeAlreadyUsed)),
        "expected VerificationCodeAlreadyUsed, got {again:?}"
    );
}

#[tokio::test]
async fn should_accept_unknown_email_silently() {
    let project = test_project();
    let fx = Fixture::new();

    fx.send_uc()
        .execute(&project, send_input("nobody@example.com", TEST_CALLBACK_URL))
        .await
        .unwrap();

    assert_eq!(fx.codes.len(), 0);
    assert!(fx.outbox.events().is_empty());
}

#[tokio::test]
async fn should_reject_disallowed_callback_even_for_unknown_email() {
    let project = test_project();
    let fx = Fixture::new();

    let result = fx
        .send_uc()
        .execute(&project, send_input("nobody@example.com", "https://evil.test/reset"))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::RedirectUrlNotAllowed)),
        "expected RedirectUrlNotAllowed, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_burn_code_on_weak_password() {
    let project = test_project();
    let user = test_user(project.id);
    let fx = Fixture::new();

    fx.send_uc()
        .execute(&project, send_input(&user.primary_email, TEST_CALLBACK_URL))
        .await
        .unwrap();
    let code = fx.only_code();

    let weak = fx
        .reset_uc()
        .execute(&project, &code, "short".to_owned())
        .await;
    assert!(
        matches!(weak, Err(AuthServiceError::WeakPassword(_))),
        "expected WeakPassword, got {weak:?}"
    );
    assert!(fx.codes.get(&code).unwrap().used_at.is_none());

    fx.reset_uc()
        .execute(&project, &code, "long-enough-now".to_owned())
        .await
        .unwrap();
}

#[tokio::test]
async fn should_check_reset_code_without_consuming() {
    let project = test_project();
    let user = test_user(project.id);
    let fx = Fixture::new();

    fx.send_uc()
        .execute(&project, send_input(&user.primary_email, TEST_CALLBACK_URL))
        .await
        .unwrap();
    let code = fx.only_code();

    let handler = password_reset(fx.users.clone(), fx.outbox.clone(), fx.codes.clone());
    handler.check_code(&project, &code).await.unwrap();
    handler.check_code(&project, &code).await.unwrap();
    assert!(fx.codes.get(&code).unwrap().used_at.is_none());
}
