//! Refresh-token codec
//!
//! Refresh tokens are HMAC-signed JWTs carrying the subject user id, issue
//! and expiry times, and a random token id. Verification only accepts the
//! HMAC algorithm family; any other `alg` in the header is rejected before
//! the claims are looked at.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tollgate_types::UserId;
use uuid::Uuid;

use crate::{AuthConfig, AuthError};

/// Algorithms accepted on verification
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims encoded in every refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject user id
    #[serde(rename = "userID")]
    pub user_id: i64,
    /// Issued at (UTC Unix seconds)
    pub iat: i64,
    /// Expiration (UTC Unix seconds)
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jti: String,
}

impl RefreshClaims {
    /// Claims for `user_id` issued at `now` and valid for `lifetime`.
    ///
    /// Fails with [`AuthError::Internal`] when `now + lifetime` falls outside
    /// the representable date range.
    pub fn new(user_id: UserId, now: DateTime<Utc>, lifetime: Duration) -> Result<Self, AuthError> {
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            tracing::error!(?lifetime, "Refresh token expiry out of range");
            AuthError::Internal("refresh token expiry out of range".to_string())
        })?;

        Ok(Self {
            user_id: user_id.0,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    pub fn subject(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Expired once `now` is strictly past `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Seconds left at `now`, negative once expired. Saturates for extreme `exp`.
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> i64 {
        self.exp.saturating_sub(now.timestamp())
    }
}

/// Signs and verifies refresh tokens with a symmetric secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    rotation_window: Duration,
}

impl TokenCodec {
    /// Create a codec from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.refresh_token_secret.as_bytes();

        // Expiry and subject are checked by hand so that an expired or
        // mismatched token yields `Ok(false)` instead of an error.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime: config.refresh_token_lifetime,
            rotation_window: config.rotation_window,
        }
    }

    /// Lifetime given to newly issued tokens
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `user_id`, valid from now
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.sign(&RefreshClaims::new(user_id, now, self.lifetime)?)
    }

    /// Sign arbitrary claims with HS256
    pub fn sign(&self, claims: &RefreshClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign refresh token: {}", e);
            AuthError::Internal("failed to sign refresh token".to_string())
        })
    }

    /// Verify the signature and decode the claims.
    ///
    /// Fails with [`AuthError::InvalidToken`] on a bad signature, a foreign
    /// algorithm, or missing/wrong-typed `userID` and `exp` claims. Does not
    /// look at the expiry.
    pub fn decode(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    JwtErrorKind::InvalidAlgorithm => {
                        tracing::warn!("Refresh token signed with unexpected algorithm");
                    }
                    _ => tracing::debug!("Refresh token rejected: {}", e),
                }
                AuthError::InvalidToken
            })
    }

    /// Check that `token` is unexpired and issued for `expected`.
    ///
    /// Returns `Ok(false)` for a trustworthy token that is expired or belongs
    /// to someone else; structural problems are errors.
    pub fn validate(&self, token: &str, expected: UserId) -> Result<bool, AuthError> {
        self.validate_at(token, expected, Utc::now())
    }

    /// [`validate`](Self::validate) against an explicit clock
    pub fn validate_at(
        &self,
        token: &str,
        expected: UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let claims = self.decode(token)?;

        if claims.is_expired_at(now) {
            tracing::debug!(user_id = claims.user_id, "Refresh token expired");
            return Ok(false);
        }

        if claims.subject() != expected {
            tracing::debug!(
                token_user = claims.user_id,
                expected_user = expected.0,
                "Refresh token subject mismatch"
            );
            return Ok(false);
        }

        Ok(true)
    }

    /// Whether less than the rotation window remains before expiry
    pub fn is_near_expiry(&self, token: &str) -> Result<bool, AuthError> {
        self.is_near_expiry_at(token, Utc::now())
    }

    /// [`is_near_expiry`](Self::is_near_expiry) against an explicit clock
    pub fn is_near_expiry_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthError> {
        let claims = self.decode(token)?;
        Ok(claims.remaining_secs_at(now) < self.rotation_window.num_seconds())
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("lifetime", &self.lifetime)
            .field("rotation_window", &self.rotation_window)
            .finish_non_exhaustive()
    }
}
