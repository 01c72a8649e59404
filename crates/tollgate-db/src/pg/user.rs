//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{DbError, DbResult};
use crate::models::UserRow;
use crate::repo::{CreateUser, UserRepository};

/// PostgreSQL user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO auth.users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING user_id, email, password_hash
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        // ON CONFLICT DO NOTHING returns no row for a duplicate email
        row.ok_or(DbError::UniqueViolation)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, email, password_hash
            FROM auth.users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE auth.users SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
