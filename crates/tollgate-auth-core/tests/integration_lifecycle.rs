//! End-to-end lifecycle tests against the in-memory stores

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{memory_service, test_config, FailingSessionRepository, FailingUserRepository};
use tollgate_auth_core::{AuthError, AuthService, ErrorKind, RefreshClaims, TokenCodec};
use tollgate_db::{
    CreateSession, MemorySessionRepository, MemoryUserRepository, SessionRepository,
    UserRepository,
};
use tollgate_types::{RefreshCheck, UserId};

// ============================================================================
// Walkthrough
// ============================================================================

#[tokio::test]
async fn test_register_login_check_logout_check() {
    let (service, _, _) = memory_service();

    service.register("a@x.com", "pass1").await.unwrap();
    let (user_id, t1) = service.login("a@x.com", "pass1").await.unwrap();
    assert_eq!(user_id, UserId(1));

    let check = service.is_refresh_token_valid(UserId(1), &t1).await.unwrap();
    assert_eq!(check, RefreshCheck::valid());

    service.logout(&t1).await.unwrap();

    let err = service
        .is_refresh_token_valid(UserId(1), &t1)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenNotFound));
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_duplicate_registration_keeps_first_hash() {
    let (service, users, _) = memory_service();

    service.register("a@x.com", "pass1").await.unwrap();
    let before = users.find_by_email("a@x.com").await.unwrap().unwrap();

    let err = service.register("a@x.com", "pass2").await.unwrap_err();
    assert!(matches!(err, AuthError::UserExists));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let after = users.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(before.password_hash, after.password_hash);

    service.login("a@x.com", "pass1").await.unwrap();
    let err = service.login("a@x.com", "pass2").await.unwrap_err();
    assert!(matches!(err, AuthError::WrongPassword));
}

#[tokio::test]
async fn test_stored_hash_is_not_plaintext() {
    let (service, users, _) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();

    let row = users.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_ne!(row.password_hash, "pass1");
    assert!(row.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_concurrent_registration_admits_one() {
    let (service, users, _) = memory_service();
    let service = Arc::new(service);

    let attempts = (0..8).map(|i| {
        let service = Arc::clone(&service);
        async move { service.register("race@x.com", &format!("pass{i}")).await }
    });
    let results = futures::future::join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::UserExists)))
        .count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(users.len(), 1);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_token_passes_immediately() {
    let (service, _, _) = memory_service();
    let id = service.register("a@x.com", "pass1").await.unwrap();
    let (user_id, token) = service.login("a@x.com", "pass1").await.unwrap();

    assert_eq!(user_id, id);
    let check = service.is_refresh_token_valid(id, &token).await.unwrap();
    assert!(check.valid);
    assert!(check.new_token.is_none());
}

#[tokio::test]
async fn test_wrong_password_creates_no_session() {
    let (service, _, sessions) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();

    let err = service.login("a@x.com", "nope").await.unwrap_err();
    assert!(matches!(err, AuthError::WrongPassword));
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_email_not_found() {
    let (service, _, sessions) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();

    let err = service.login("A@x.com", "pass1").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_logins_accumulate_sessions() {
    let (service, _, _) = memory_service();
    let id = service.register("a@x.com", "pass1").await.unwrap();

    let (_, t1) = service.login("a@x.com", "pass1").await.unwrap();
    let (_, t2) = service.login("a@x.com", "pass1").await.unwrap();
    assert_ne!(t1, t2);

    assert_eq!(service.list_sessions(id).await.unwrap().len(), 2);
    assert!(service.is_refresh_token_valid(id, &t1).await.unwrap().valid);
    assert!(service.is_refresh_token_valid(id, &t2).await.unwrap().valid);
}

// ============================================================================
// Refresh-token checks
// ============================================================================

#[tokio::test]
async fn test_token_for_other_user_is_invalid() {
    let (service, _, _) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();
    service.register("b@x.com", "pass2").await.unwrap();
    let (_, token_a) = service.login("a@x.com", "pass1").await.unwrap();

    let check = service
        .is_refresh_token_valid(UserId(2), &token_a)
        .await
        .unwrap();
    assert_eq!(check, RefreshCheck::invalid());
}

#[tokio::test]
async fn test_near_expiry_token_rotates() {
    let users = Arc::new(MemoryUserRepository::new());
    let sessions = Arc::new(MemorySessionRepository::new());
    let config = test_config().with_refresh_token_lifetime(Duration::hours(1));
    let service = AuthService::new(config, users, Arc::clone(&sessions)).unwrap();

    let id = service.register("a@x.com", "pass1").await.unwrap();
    let (_, old) = service.login("a@x.com", "pass1").await.unwrap();

    let check = service.is_refresh_token_valid(id, &old).await.unwrap();
    assert!(check.valid);
    let new_token = check.new_token.expect("near-expiry token is rotated");
    assert!(!new_token.is_empty());
    assert_ne!(new_token, old);

    // Superseded session is kept
    assert!(sessions.exists(&old).await.unwrap());
    assert!(sessions.exists(&new_token).await.unwrap());
    assert_eq!(service.list_sessions(id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_expired_stored_token_is_invalid_not_error() {
    let (service, _, sessions) = memory_service();
    let id = service.register("a@x.com", "pass1").await.unwrap();

    let codec = TokenCodec::new(&test_config());
    let now = Utc::now();
    let expired = codec
        .sign(&RefreshClaims {
            user_id: id.get(),
            iat: (now - Duration::days(31)).timestamp(),
            exp: (now - Duration::seconds(1)).timestamp(),
            jti: "expired".to_string(),
        })
        .unwrap();
    sessions
        .create(CreateSession {
            user_id: id.get(),
            refresh_token: expired.clone(),
        })
        .await
        .unwrap();

    let check = service.is_refresh_token_valid(id, &expired).await.unwrap();
    assert_eq!(check, RefreshCheck::invalid());
}

#[tokio::test]
async fn test_stored_token_from_other_secret_is_invalid_token() {
    let (service, _, sessions) = memory_service();
    let id = service.register("a@x.com", "pass1").await.unwrap();

    let foreign = tollgate_auth_core::AuthConfig::try_new("a-completely-different-secret-value!!")
        .unwrap();
    let token = TokenCodec::new(&foreign).issue(id).unwrap();
    sessions
        .create(CreateSession {
            user_id: id.get(),
            refresh_token: token.clone(),
        })
        .await
        .unwrap();

    let err = service.is_refresh_token_valid(id, &token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_unknown_token() {
    let (service, _, _) = memory_service();
    let err = service.logout("never-issued").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_logout_twice() {
    let (service, _, _) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();
    let (_, token) = service.login("a@x.com", "pass1").await.unwrap();

    service.logout(&token).await.unwrap();
    let err = service.logout(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

// ============================================================================
// Password change
// ============================================================================

#[tokio::test]
async fn test_change_password_revokes_only_given_session() {
    let (service, _, _) = memory_service();
    let id = service.register("a@x.com", "pass1").await.unwrap();
    let (_, t1) = service.login("a@x.com", "pass1").await.unwrap();
    let (_, t2) = service.login("a@x.com", "pass1").await.unwrap();

    service
        .change_password("a@x.com", "pass1", "pass2", &t1)
        .await
        .unwrap();

    let err = service.login("a@x.com", "pass1").await.unwrap_err();
    assert!(matches!(err, AuthError::WrongPassword));
    service.login("a@x.com", "pass2").await.unwrap();

    let err = service.is_refresh_token_valid(id, &t1).await.unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenNotFound));
    assert!(service.is_refresh_token_valid(id, &t2).await.unwrap().valid);
}

#[tokio::test]
async fn test_change_password_wrong_old_password() {
    let (service, _, _) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();
    let (_, token) = service.login("a@x.com", "pass1").await.unwrap();

    let err = service
        .change_password("a@x.com", "bad1", "pass2", &token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::WrongPassword));

    // Nothing changed
    service.login("a@x.com", "pass1").await.unwrap();
    service.logout(&token).await.unwrap();
}

#[tokio::test]
async fn test_change_password_unknown_user() {
    let (service, _, _) = memory_service();
    let err = service
        .change_password("nobody@x.com", "pass1", "pass2", "token")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_change_password_missing_session_still_updates_hash() {
    let (service, _, _) = memory_service();
    service.register("a@x.com", "pass1").await.unwrap();

    let err = service
        .change_password("a@x.com", "pass1", "pass2", "no-such-session")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));

    service.login("a@x.com", "pass2").await.unwrap();
}

// ============================================================================
// Store outages
// ============================================================================

#[tokio::test]
async fn test_store_failures_are_internal() {
    let service = AuthService::new(
        test_config(),
        Arc::new(FailingUserRepository),
        Arc::new(FailingSessionRepository),
    )
    .unwrap();

    let errors = [
        service.register("a@x.com", "pass1").await.unwrap_err(),
        service.login("a@x.com", "pass1").await.unwrap_err(),
        service.logout("token").await.unwrap_err(),
        service
            .is_refresh_token_valid(UserId(1), "token")
            .await
            .unwrap_err(),
        service
            .change_password("a@x.com", "pass1", "pass2", "token")
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.kind(), ErrorKind::Internal, "{err:?}");
    }
}

#[tokio::test]
async fn test_session_store_failure_after_password_check() {
    let users = Arc::new(MemoryUserRepository::new());
    let healthy = AuthService::new(
        test_config(),
        Arc::clone(&users),
        Arc::new(MemorySessionRepository::new()),
    )
    .unwrap();
    healthy.register("a@x.com", "pass1").await.unwrap();

    let broken = AuthService::new(test_config(), users, Arc::new(FailingSessionRepository)).unwrap();
    let err = broken.login("a@x.com", "pass1").await.unwrap_err();
    assert!(matches!(err, AuthError::Internal(_)));
}
