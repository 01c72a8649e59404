//! Configuration types for auth service

use chrono::Duration;
use tollgate_types::{default_refresh_token_lifetime, default_rotation_window};

use crate::AuthError;

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing refresh tokens
    pub refresh_token_secret: String,
    /// Lifetime encoded into every issued refresh token
    pub refresh_token_lifetime: Duration,
    /// Tokens with less remaining lifetime than this are rotated
    pub rotation_window: Duration,
    /// Password hashing work factor
    pub hashing: HashingConfig,
}

impl AuthConfig {
    /// Minimum allowed secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a new auth config, rejecting a missing or short secret
    pub fn try_new(refresh_token_secret: impl Into<String>) -> Result<Self, AuthError> {
        let refresh_token_secret = refresh_token_secret.into();

        if refresh_token_secret.is_empty() {
            return Err(AuthError::Configuration(
                "refresh token secret is not set".to_string(),
            ));
        }

        if refresh_token_secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(AuthError::Configuration(format!(
                "refresh token secret too short: got {} bytes, need at least {}",
                refresh_token_secret.len(),
                Self::MIN_SECRET_LENGTH
            )));
        }

        Ok(Self {
            refresh_token_secret,
            refresh_token_lifetime: default_refresh_token_lifetime(),
            rotation_window: default_rotation_window(),
            hashing: HashingConfig::default(),
        })
    }

    /// Set refresh token lifetime
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Set rotation window
    pub fn with_rotation_window(mut self, window: Duration) -> Self {
        self.rotation_window = window;
        self
    }

    /// Set password hashing work factor
    pub fn with_hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_length", &self.refresh_token_secret.len())
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field("rotation_window", &self.rotation_window)
            .field("hashing", &self.hashing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_rejected() {
        let result = AuthConfig::try_new("");
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = AuthConfig::try_new("a".repeat(31));
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::try_new("a".repeat(32)).unwrap();
        assert_eq!(config.refresh_token_lifetime, Duration::days(30));
        assert_eq!(config.rotation_window, Duration::hours(24));
        assert_eq!(config.hashing, HashingConfig::default());
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = "super-secret-value-that-must-not-leak";
        let config = AuthConfig::try_new(secret).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(secret));
        assert!(rendered.contains("secret_length"));
    }
}
