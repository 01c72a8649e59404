//! Tollgate DB - Session store contract
//!
//! Repository traits the auth core depends on, with a SQLx/PostgreSQL
//! implementation for production and a `DashMap`-backed implementation for
//! tests and local development.
//!
//! # Example
//!
//! ```rust,ignore
//! use tollgate_db::{create_pool, Repositories, UserRepository};
//!
//! let pool = create_pool("postgres://localhost/tollgate").await?;
//! tollgate_db::pg::ensure_schema(&pool).await?;
//! let repos = Repositories::new(pool).with_session_ttl_days(30);
//!
//! let user = repos.users.find_by_email("user@example.com").await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::{MemorySessionRepository, MemoryUserRepository};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use repo::*;
