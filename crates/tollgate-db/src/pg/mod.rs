//! PostgreSQL repository implementations

mod schema;
mod session;
mod user;

pub use schema::{ensure_schema, schema_present};
pub use session::PgSessionRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub sessions: PgSessionRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool),
        }
    }

    /// Store-side session lifetime, normally the refresh-token lifetime
    pub fn with_session_ttl_days(mut self, days: i32) -> Self {
        self.sessions = self.sessions.with_ttl_days(days);
        self
    }
}
