//! End-to-end authentication flow tests against in-memory backends.

mod common;

use std::sync::Arc;

use common::{InMemoryTokenRepository, InMemoryUserRepository, RecordingMailer, code_of};
use warden::cache::{CacheStore, MemoryCache};
use warden::error::AppError;
use warden::models::user::User;
use warden::security::keys::sha256_hex;
use warden::security::password::hash_password;
use warden::security::rate_limit::RateLimitConfig;
use warden::services::auth::{AuthService, create_auth_service};

const PASSWORD: &str = "correct-horse-battery";

struct Harness {
    auth: Arc<dyn AuthService>,
    users: Arc<InMemoryUserRepository>,
    tokens: Arc<InMemoryTokenRepository>,
    mailer: Arc<RecordingMailer>,
    cache: Arc<MemoryCache>,
}

fn harness_with(users: Vec<User>) -> Harness {
    let users = InMemoryUserRepository::with_users(users);
    let tokens = Arc::new(InMemoryTokenRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let cache = Arc::new(MemoryCache::new());

    let auth = create_auth_service(
        users.clone(),
        tokens.clone(),
        cache.clone(),
        mailer.clone(),
        RateLimitConfig::default(),
    );

    Harness {
        auth,
        users,
        tokens,
        mailer,
        cache,
    }
}

fn alice() -> User {
    User::new("Alice", "alice@example.com", &hash_password(PASSWORD).unwrap())
}

fn harness() -> Harness {
    harness_with(vec![alice()])
}

#[tokio::test]
async fn login_issues_token_that_authenticates() {
    let h = harness();

    let result = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap();
    assert!(!result.token.is_empty());
    assert!(result.user.last_login_at.is_some());
    assert_eq!(result.user.last_ip.as_deref(), Some("10.0.0.1"));

    // Only the hash is persisted.
    let stored = h.tokens.tokens.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].token_hash, sha256_hex(&result.token));

    let user = h.auth.authenticate(&result.token).await.unwrap();
    assert_eq!(user.id, result.user.id);
}

#[tokio::test]
async fn login_identifier_is_normalized() {
    let h = harness();
    let result = h
        .auth
        .login("  ALICE@Example.COM ", PASSWORD, "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(result.user.email, "alice@example.com");
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let h = harness();

    let unknown = h
        .auth
        .login("nobody@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap_err();
    let wrong = h
        .auth
        .login("alice@example.com", "wrong-password", "10.0.0.1")
        .await
        .unwrap_err();

    assert_eq!(code_of(&unknown), (401, "INVALID_CREDENTIALS".to_string()));
    assert_eq!(code_of(&wrong), (401, "INVALID_CREDENTIALS".to_string()));
}

#[tokio::test]
async fn inactive_user_cannot_login() {
    let mut user = alice();
    user.is_active = false;
    let h = harness_with(vec![user]);

    let err = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err).1, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn repeated_failures_rate_limit_then_block() {
    let h = harness();

    for _ in 0..5 {
        let err = h
            .auth
            .login("alice@example.com", "wrong", "10.0.0.1")
            .await
            .unwrap_err();
        assert_eq!(code_of(&err).1, "INVALID_CREDENTIALS");
    }

    // Limit reached: next attempt plants the block marker.
    let err = h
        .auth
        .login("alice@example.com", "wrong", "10.0.0.1")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), (429, "LOGIN_RATE_LIMIT".to_string()));

    // Even the correct password is rejected while blocked.
    let err = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), (403, "LOGIN_TEMP_BLOCKED".to_string()));
}

#[tokio::test]
async fn failures_from_another_ip_do_not_lock_out() {
    let h = harness();

    for _ in 0..5 {
        let _ = h.auth.login("alice@example.com", "wrong", "10.0.0.9").await;
    }

    assert!(
        h.auth
            .login("alice@example.com", PASSWORD, "10.0.0.1")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn successful_login_clears_the_failure_counter() {
    let h = harness();

    for _ in 0..3 {
        let _ = h.auth.login("alice@example.com", "wrong", "10.0.0.1").await;
    }
    h.auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap();

    // A fresh window: four more failures stay under the limit.
    for _ in 0..4 {
        let err = h
            .auth
            .login("alice@example.com", "wrong", "10.0.0.1")
            .await
            .unwrap_err();
        assert_eq!(code_of(&err).1, "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let h = harness();
    let result = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap();

    h.auth.logout(&result.token).await.unwrap();

    let err = h.auth.authenticate(&result.token).await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
}

#[tokio::test]
async fn revoke_all_drops_every_session() {
    let h = harness();
    let first = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap();
    let second = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.2")
        .await
        .unwrap();

    h.auth.revoke_all(&first.user.id).await.unwrap();

    assert!(h.auth.authenticate(&first.token).await.is_err());
    assert!(h.auth.authenticate(&second.token).await.is_err());
}

#[tokio::test]
async fn deactivated_user_fails_authentication_with_403() {
    let h = harness();
    let result = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap();

    {
        let mut users = h.users.users.lock().unwrap();
        users[0].is_active = false;
    }
    // Drop the cached copy so the repository is consulted again.
    h.cache
        .delete(&format!("user:{}", result.user.id))
        .await
        .unwrap();

    let err = h.auth.authenticate(&result.token).await.unwrap_err();
    assert_eq!(code_of(&err), (403, "USER_INACTIVE".to_string()));
}

#[tokio::test]
async fn update_password_requires_the_current_one() {
    let h = harness();
    let user_id = h.users.users.lock().unwrap()[0].id.clone();

    let err = h
        .auth
        .update_password(&user_id, "wrong", "a-new-password-123")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), (400, "INVALID_CURRENT_PASSWORD".to_string()));

    h.auth
        .update_password(&user_id, PASSWORD, "a-new-password-123")
        .await
        .unwrap();
    assert!(
        h.auth
            .login("alice@example.com", "a-new-password-123", "10.0.0.1")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn password_reset_roundtrip() {
    let h = harness();

    h.auth
        .request_password_reset("alice@example.com", "10.0.0.1")
        .await
        .unwrap();
    let code = h.mailer.last_code().expect("reset email with code");

    h.auth
        .confirm_password_reset("alice@example.com", &code, "brand-new-pass-1", "10.0.0.1")
        .await
        .unwrap();

    assert!(
        h.auth
            .login("alice@example.com", "brand-new-pass-1", "10.0.0.1")
            .await
            .is_ok()
    );

    // The token is single use.
    let err = h
        .auth
        .confirm_password_reset("alice@example.com", &code, "another-pass-12", "10.0.0.1")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), (400, "RESET_TOKEN_INVALID".to_string()));
}

#[tokio::test]
async fn password_reset_revokes_existing_sessions() {
    let h = harness();
    let session = h
        .auth
        .login("alice@example.com", PASSWORD, "10.0.0.1")
        .await
        .unwrap();

    h.auth
        .request_password_reset("alice@example.com", "10.0.0.1")
        .await
        .unwrap();
    let code = h.mailer.last_code().unwrap();
    h.auth
        .confirm_password_reset("alice@example.com", &code, "brand-new-pass-1", "10.0.0.1")
        .await
        .unwrap();

    assert!(h.auth.authenticate(&session.token).await.is_err());
}

#[tokio::test]
async fn reset_request_for_unknown_email_is_silent() {
    let h = harness();

    h.auth
        .request_password_reset("nobody@example.com", "10.0.0.1")
        .await
        .unwrap();

    assert!(h.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reset_confirm_rejects_a_wrong_token() {
    let h = harness();

    h.auth
        .request_password_reset("alice@example.com", "10.0.0.1")
        .await
        .unwrap();

    let err = h
        .auth
        .confirm_password_reset(
            "alice@example.com",
            "not-the-right-token",
            "brand-new-pass-1",
            "10.0.0.1",
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), (400, "RESET_TOKEN_INVALID".to_string()));
}

#[tokio::test]
async fn email_verification_roundtrip() {
    let h = harness();

    h.auth
        .request_email_verification("alice@example.com", "10.0.0.1")
        .await
        .unwrap();
    let code = h.mailer.last_code().expect("verification email with code");

    h.auth
        .confirm_email_verification("alice@example.com", &code, "10.0.0.1")
        .await
        .unwrap();

    let users = h.users.users.lock().unwrap();
    assert!(users[0].email_verified_at.is_some());
}

#[tokio::test]
async fn over_limit_reset_requests_alert_the_account_owner() {
    let h = harness();

    for _ in 0..5 {
        h.auth
            .request_password_reset("alice@example.com", "10.0.0.1")
            .await
            .unwrap();
    }
    h.auth
        .request_password_reset("alice@example.com", "10.0.0.1")
        .await
        .unwrap();

    let sent = h.mailer.sent.lock().unwrap();
    assert!(sent.iter().any(|e| e.subject.contains("Suspicious")));
    assert_eq!(sent.last().unwrap().to, "alice@example.com");
}

#[tokio::test]
async fn over_limit_verification_requests_alert_the_account_owner() {
    let h = harness();

    for _ in 0..5 {
        h.auth
            .request_email_verification("alice@example.com", "10.0.0.1")
            .await
            .unwrap();
    }
    h.auth
        .request_email_verification("alice@example.com", "10.0.0.1")
        .await
        .unwrap();

    // Five codes went out, then the alert instead of a sixth code.
    let sent = h.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 6);
    assert!(sent.last().unwrap().subject.contains("Suspicious"));
}

#[tokio::test]
async fn email_verification_rejects_a_wrong_token() {
    let h = harness();

    h.auth
        .request_email_verification("alice@example.com", "10.0.0.1")
        .await
        .unwrap();

    let err = h
        .auth
        .confirm_email_verification("alice@example.com", "bogus", "10.0.0.1")
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), (400, "VERIFY_TOKEN_INVALID".to_string()));
}
