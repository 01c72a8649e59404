//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connectivity, protocol, decoding)
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// A unique constraint rejected the write
    #[error("unique constraint violated")]
    UniqueViolation,

    /// Record not found
    #[error("record not found")]
    NotFound,
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::UniqueViolation,
            sqlx::Error::RowNotFound => Self::NotFound,
            _ => Self::Sqlx(err),
        }
    }
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
