//! Repository traits
//!
//! The persistence operations the auth core depends on. Every method is
//! atomic at single-row granularity; callers never need a transaction.

use async_trait::async_trait;
use chrono::Duration;

use crate::error::DbResult;
use crate::models::*;

/// How long the store keeps a session row before it counts as expired
pub const SESSION_TTL_DAYS: i64 = tollgate_types::REFRESH_TOKEN_LIFETIME_DAYS;

/// Store-side session lifetime
pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user.
    ///
    /// Returns [`DbError::UniqueViolation`](crate::DbError::UniqueViolation)
    /// when the email is already registered.
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Find a user by exact email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Replace the stored password hash for the user with this email
    async fn update_password_hash(&self, email: &str, password_hash: &str) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a session for a freshly issued refresh token
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow>;

    /// Whether a session row exists for this exact token
    async fn exists(&self, refresh_token: &str) -> DbResult<bool>;

    /// Delete the session for this exact token, returning rows affected
    async fn delete(&self, refresh_token: &str) -> DbResult<u64>;

    /// Find all sessions for a user, newest first
    async fn find_by_user_id(&self, user_id: i64) -> DbResult<Vec<SessionRow>>;

    /// Delete sessions whose store-side expiry has passed
    async fn delete_expired(&self) -> DbResult<u64>;
}

/// Create session input
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: i64,
    pub refresh_token: String,
}
