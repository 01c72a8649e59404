//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tollgate_types::{Session, UserId};

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
}

/// Session row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_id: i64,
    pub user_id: i64,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}
