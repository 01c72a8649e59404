//! Configuration for the Auth API service.

use std::net::SocketAddr;
use std::time::Duration;

use tollgate_auth_core::{AuthConfig, HashingConfig};

/// Upper bound for `REFRESH_TOKEN_LIFETIME_DAYS`
pub const MAX_REFRESH_TOKEN_LIFETIME_DAYS: i64 = 3650;

/// Upper bound for `REFRESH_ROTATION_WINDOW_HOURS`
pub const MAX_ROTATION_WINDOW_HOURS: i64 = MAX_REFRESH_TOKEN_LIFETIME_DAYS * 24;

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// gRPC listen address
    pub grpc_addr: SocketAddr,

    /// HTTP listen address (health, readiness, metrics)
    pub http_addr: SocketAddr,

    /// Database URL
    pub database_url: String,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Request timeout for HTTP routes
    pub request_timeout: Duration,

    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Required
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let grpc_addr = lookup("GRPC_ADDR")
            .ok_or(ConfigError::Missing("GRPC_ADDR"))?
            .parse()
            .map_err(|_| ConfigError::Invalid("GRPC_ADDR"))?;

        let refresh_token_secret = lookup("REFRESH_TOKEN_SECRET")
            .ok_or(ConfigError::Missing("REFRESH_TOKEN_SECRET"))?;

        // Optional
        let http_addr = lookup("HTTP_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_ADDR"))?;

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let metrics_enabled = lookup("METRICS_ENABLED")
            .map(|v| v.parse().unwrap_or(true))
            .unwrap_or(true);

        let lifetime_days: i64 = parse_or(&lookup, "REFRESH_TOKEN_LIFETIME_DAYS", 30)?;
        let refresh_token_lifetime = Some(lifetime_days)
            .filter(|days| (1..=MAX_REFRESH_TOKEN_LIFETIME_DAYS).contains(days))
            .and_then(chrono::Duration::try_days)
            .ok_or(ConfigError::Invalid("REFRESH_TOKEN_LIFETIME_DAYS"))?;

        let rotation_window_hours: i64 = parse_or(&lookup, "REFRESH_ROTATION_WINDOW_HOURS", 24)?;
        let rotation_window = Some(rotation_window_hours)
            .filter(|hours| (0..=MAX_ROTATION_WINDOW_HOURS).contains(hours))
            .and_then(chrono::Duration::try_hours)
            .ok_or(ConfigError::Invalid("REFRESH_ROTATION_WINDOW_HOURS"))?;

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        let auth = AuthConfig::try_new(refresh_token_secret)
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_refresh_token_lifetime(refresh_token_lifetime)
            .with_rotation_window(rotation_window)
            .with_hashing(hashing);

        Ok(Self {
            grpc_addr,
            http_addr,
            database_url,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }

    /// Session lifetime in whole days, as the store records it
    pub fn session_ttl_days(&self) -> i32 {
        i32::try_from(self.auth.refresh_token_lifetime.num_days()).unwrap_or(i32::MAX)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
