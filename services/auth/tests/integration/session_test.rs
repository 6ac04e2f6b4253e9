use std::time::Duration;

use uuid::Uuid;

use latchkey_auth::error::AuthServiceError;
use latchkey_auth::usecase::session::{SessionIdentity, verify_access_token};

use crate::helpers::{MockRefreshTokenRepo, TEST_JWT_SECRET, sessions, test_project, test_user};

#[tokio::test]
async fn should_issue_refresh_and_revoke_token_pair() {
    let project = test_project();
    let user = test_user(project.id);
    let tokens = MockRefreshTokenRepo::empty();
    let manager = sessions(tokens.clone());

    let pair = manager.issue_token_pair(project.id, user.id).await.unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(!pair.refresh_token.is_empty());

    let identity = manager.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(
        identity,
        SessionIdentity {
            project_id: project.id,
            user_id: user.id,
        }
    );

    let refreshed = manager
        .refresh_access_token(project.id, &pair.refresh_token)
        .await
        .unwrap();
    assert_ne!(refreshed.access_token, pair.access_token);
    assert_eq!(
        manager.verify_access_token(&refreshed.access_token).unwrap(),
        identity
    );

    manager
        .revoke_refresh_token(project.id, &pair.refresh_token)
        .await
        .unwrap();
    assert_eq!(tokens.len(), 0);

    let after_revoke = manager
        .refresh_access_token(project.id, &pair.refresh_token)
        .await;
    assert!(
        matches!(after_revoke, Err(AuthServiceError::RefreshTokenNotFound)),
        "expected RefreshTokenNotFound, got {after_revoke:?}"
    );

    // Already minted access tokens stay valid until expiry.
    manager.verify_access_token(&refreshed.access_token).unwrap();
}

#[tokio::test]
async fn should_return_not_found_when_revoking_twice() {
    let project = test_project();
    let manager = sessions(MockRefreshTokenRepo::empty());
    let pair = manager
        .issue_token_pair(project.id, Uuid::new_v4())
        .await
        .unwrap();

    manager
        .revoke_refresh_token(project.id, &pair.refresh_token)
        .await
        .unwrap();
    let second = manager
        .revoke_refresh_token(project.id, &pair.refresh_token)
        .await;
    assert!(
        matches!(second, Err(AuthServiceError::RefreshTokenNotFound)),
        "expected RefreshTokenNotFound, got {second:?}"
    );
}

#[tokio::test]
async fn should_not_refresh_with_token_from_another_project() {
    let project = test_project();
    let manager = sessions(MockRefreshTokenRepo::empty());
    let pair = manager
        .issue_token_pair(project.id, Uuid::new_v4())
        .await
        .unwrap();

    let result = manager
        .refresh_access_token(crate::helpers::other_project().id, &pair.refresh_token)
        .await;
    assert!(
        matches!(result, Err(AuthServiceError::RefreshTokenNotFound)),
        "expected RefreshTokenNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_tampered_or_foreign_access_token() {
    let project = test_project();
    let manager = sessions(MockRefreshTokenRepo::empty());
    let pair = manager
        .issue_token_pair(project.id, Uuid::new_v4())
        .await
        .unwrap();

    let result = verify_access_token(&pair.access_token, "another-secret");
    assert!(
        matches!(result, Err(AuthServiceError::AccessTokenInvalid)),
        "expected AccessTokenInvalid, got {result:?}"
    );

    let result = verify_access_token("not.a.jwt", TEST_JWT_SECRET);
    assert!(
        matches!(result, Err(AuthServiceError::AccessTokenInvalid)),
        "expected AccessTokenInvalid, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_access_token() {
    let project = test_project();
    let manager = sessions(MockRefreshTokenRepo::empty()).with_access_token_ttl(0);
    let pair = manager
        .issue_token_pair(project.id, Uuid::new_v4())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let result = manager.verify_access_token(&pair.access_token);
    assert!(
        matches!(result, Err(AuthServiceError::AccessTokenExpired)),
        "expected AccessTokenExpired, got {result:?}"
    );
}
