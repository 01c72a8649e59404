//! Argon2id password hashing and verification.
//!
//! Hashes use a fresh random salt per call and are stored as PHC strings, so
//! the algorithm parameters travel with the hash. Raising the work factor in
//! [`HashingConfig`] only affects new hashes; old ones still verify.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::{AuthError, HashingConfig};

/// One-way credential hasher
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher with the given work factor
    pub fn new(config: &HashingConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Configuration(format!("invalid argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password, returning the PHC string
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                AuthError::Internal("failed to hash password".to_string())
            })?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// `Ok(false)` means the password does not match; a stored hash that
    /// cannot be parsed is an internal error.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Stored password hash is malformed: {}", e);
            AuthError::Internal("malformed password hash".to_string())
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Failed to verify password: {}", e);
                Err(AuthError::Internal("failed to verify password".to_string()))
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {}", e);
                AuthError::Internal("password hashing task failed".to_string())
            })?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_blocking(&self, hash: &str, password: &str) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let hash = hash.to_owned();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| {
                tracing::error!("Password verification task failed: {}", e);
                AuthError::Internal("password verification task failed".to_string())
            })?
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
