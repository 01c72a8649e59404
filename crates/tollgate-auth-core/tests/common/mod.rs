//! Common test utilities for tollgate-auth-core integration tests

#![allow(dead_code)]

pub mod mock_repos;

use std::sync::Arc;

use tollgate_auth_core::{AuthConfig, AuthService, HashingConfig};
use tollgate_db::{MemorySessionRepository, MemoryUserRepository};

#[allow(unused_imports)]
pub use mock_repos::{FailingSessionRepository, FailingUserRepository};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub type MemoryAuthService = AuthService<MemoryUserRepository, MemorySessionRepository>;

/// Cheapest argon2 parameters that still exercise the real hasher
pub fn fast_hashing() -> HashingConfig {
    HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(TEST_SECRET)
        .expect("test secret is long enough")
        .with_hashing(fast_hashing())
}

/// Service over fresh in-memory stores, with handles on the stores
pub fn memory_service() -> (
    MemoryAuthService,
    Arc<MemoryUserRepository>,
    Arc<MemorySessionRepository>,
) {
    let users = Arc::new(MemoryUserRepository::new());
    let sessions = Arc::new(MemorySessionRepository::new());
    let service = AuthService::new(test_config(), Arc::clone(&users), Arc::clone(&sessions))
        .expect("valid test config");
    (service, users, sessions)
}
