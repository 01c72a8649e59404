//! Session types and refresh-token lifetimes

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Default refresh token lifetime in days
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 30;

/// Tokens with less than this many hours left are rotated
pub const ROTATION_WINDOW_HOURS: i64 = 24;

/// Default refresh token lifetime
pub fn default_refresh_token_lifetime() -> Duration {
    Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)
}

/// Default rotation window
pub fn default_rotation_window() -> Duration {
    Duration::hours(ROTATION_WINDOW_HOURS)
}

/// A stored session: one issued refresh token bound to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User who owns the session
    pub user_id: UserId,
    /// The signed refresh token, unique across all sessions
    pub refresh_token: String,
    /// Session creation time
    pub created_at: DateTime<Utc>,
    /// Store-side expiration, never consulted by the auth core
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a refresh-token validity check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshCheck {
    /// Whether the presented token is currently valid for the user
    pub valid: bool,
    /// Replacement token, issued when the presented one is close to expiry
    pub new_token: Option<String>,
}

impl RefreshCheck {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn valid() -> Self {
        Self {
            valid: true,
            new_token: None,
        }
    }

    pub fn rotated(new_token: String) -> Self {
        Self {
            valid: true,
            new_token: Some(new_token),
        }
    }
}
