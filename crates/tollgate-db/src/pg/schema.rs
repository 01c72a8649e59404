//! Schema bootstrap

use crate::{DbPool, DbResult};

const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS auth",
    r#"
    CREATE TABLE IF NOT EXISTS auth.users (
        user_id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS auth.sessions (
        session_id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES auth.users(user_id) ON DELETE CASCADE,
        refresh_token TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        expires_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS sessions_user_id_idx ON auth.sessions (user_id)",
];

const SCHEMA_PRESENT: &str = "SELECT to_regclass('auth.users') IS NOT NULL \
     AND to_regclass('auth.sessions') IS NOT NULL";

/// Create the `auth` schema and its tables if they do not exist yet
pub async fn ensure_schema(pool: &DbPool) -> DbResult<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(*statement).execute(pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create auth schema");
            e
        })?;
    }

    tracing::debug!("Auth schema ready");
    Ok(())
}

/// Whether both auth tables exist. Errors when the store is unreachable.
pub async fn schema_present(pool: &DbPool) -> DbResult<bool> {
    let present = sqlx::query_scalar::<_, bool>(SCHEMA_PRESENT)
        .fetch_one(pool)
        .await?;
    Ok(present)
}
