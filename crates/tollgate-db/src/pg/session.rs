//! PostgreSQL session repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::SessionRow;
use crate::repo::{CreateSession, SessionRepository, SESSION_TTL_DAYS};

/// PostgreSQL session repository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
    ttl_days: i32,
}

impl PgSessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ttl_days: SESSION_TTL_DAYS as i32,
        }
    }

    /// Override the store-side session lifetime
    pub fn with_ttl_days(mut self, days: i32) -> Self {
        self.ttl_days = days;
        self
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO auth.sessions (user_id, refresh_token, expires_at)
            VALUES ($1, $2, NOW() + make_interval(days => $3))
            RETURNING session_id, user_id, refresh_token, created_at, expires_at
            "#,
        )
        .bind(session.user_id)
        .bind(&session.refresh_token)
        .bind(self.ttl_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn exists(&self, refresh_token: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM auth.sessions WHERE refresh_token = $1)",
        )
        .bind(refresh_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete(&self, refresh_token: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM auth.sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_user_id(&self, user_id: i64) -> DbResult<Vec<SessionRow>> {
        let sessions = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, user_id, refresh_token, created_at, expires_at
            FROM auth.sessions
            WHERE user_id = $1
            ORDER BY created_at DESC, session_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM auth.sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
