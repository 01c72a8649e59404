//! Application state

use std::sync::Arc;

use tollgate_auth_core::AuthService;
use tollgate_db::pg::{PgSessionRepository, PgUserRepository};
use tollgate_db::DbPool;

use crate::config::Config;

/// Type alias for the auth service with concrete repository types
pub type AuthServiceImpl = AuthService<PgUserRepository, PgSessionRepository>;

/// Application state shared by the gRPC service and HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth core over the PostgreSQL store
    pub auth: Arc<AuthServiceImpl>,
    /// Database pool (readiness checks)
    pub pool: DbPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(auth: AuthServiceImpl, pool: DbPool, config: Config) -> Self {
        Self {
            auth: Arc::new(auth),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
