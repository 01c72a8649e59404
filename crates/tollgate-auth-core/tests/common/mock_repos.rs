//! Repositories that fail every call, for store-outage paths

use async_trait::async_trait;
use tollgate_db::{
    CreateSession, CreateUser, DbError, DbResult, SessionRepository, SessionRow, UserRepository,
    UserRow,
};

fn outage() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// User store that is always unavailable
#[derive(Debug, Default, Clone)]
pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn create(&self, _: CreateUser) -> DbResult<UserRow> {
        Err(outage())
    }

    async fn find_by_email(&self, _: &str) -> DbResult<Option<UserRow>> {
        Err(outage())
    }

    async fn update_password_hash(&self, _: &str, _: &str) -> DbResult<()> {
        Err(outage())
    }
}

/// Session store that is always unavailable
#[derive(Debug, Default, Clone)]
pub struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn create(&self, _: CreateSession) -> DbResult<SessionRow> {
        Err(outage())
    }

    async fn exists(&self, _: &str) -> DbResult<bool> {
        Err(outage())
    }

    async fn delete(&self, _: &str) -> DbResult<u64> {
        Err(outage())
    }

    async fn find_by_user_id(&self, _: i64) -> DbResult<Vec<SessionRow>> {
        Err(outage())
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        Err(outage())
    }
}
