//! Refresh-token sessions backed by the session store
//!
//! A session is a stored refresh token. Tokens are only trusted while a row
//! for them exists; revocation deletes the row. Rotation near expiry adds a
//! new row and leaves the old one in place.

use std::sync::Arc;

use tollgate_db::{CreateSession, SessionRepository};
use tollgate_types::{RefreshCheck, Session, UserId};

use crate::token::TokenCodec;
use crate::AuthError;

/// Session manager
pub struct SessionManager<R: SessionRepository> {
    codec: TokenCodec,
    repo: Arc<R>,
}

impl<R: SessionRepository> SessionManager<R> {
    pub fn new(codec: TokenCodec, repo: Arc<R>) -> Self {
        Self { codec, repo }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a refresh token for `user_id` and persist it.
    ///
    /// Existing sessions for the user are left untouched.
    pub async fn create_session(&self, user_id: UserId) -> Result<String, AuthError> {
        let refresh_token = self.codec.issue(user_id)?;

        self.repo
            .create(CreateSession {
                user_id: user_id.get(),
                refresh_token: refresh_token.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create session: {}", e);
                AuthError::Internal("failed to create session".to_string())
            })?;

        tracing::debug!(user_id = %user_id, "Session created");
        Ok(refresh_token)
    }

    /// Whether a session row exists for `refresh_token`
    pub async fn session_exists(&self, refresh_token: &str) -> Result<bool, AuthError> {
        self.repo.exists(refresh_token).await.map_err(|e| {
            tracing::error!("Failed to look up session: {}", e);
            AuthError::Internal("failed to look up session".to_string())
        })
    }

    /// Delete the session for exactly this token.
    ///
    /// No cryptographic check is made. A token with no row is reported as
    /// [`AuthError::UserNotFound`].
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let deleted = self.repo.delete(refresh_token).await.map_err(|e| {
            tracing::error!("Failed to delete session: {}", e);
            AuthError::Internal("failed to delete session".to_string())
        })?;

        if deleted == 0 {
            tracing::debug!("No session matches the refresh token");
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    /// Check a refresh token and rotate it when close to expiry.
    ///
    /// 1. No stored session: [`AuthError::RefreshTokenNotFound`].
    /// 2. Structurally bad token: [`AuthError::InvalidToken`]; expired or
    ///    issued for another user: invalid, no new token.
    /// 3. Valid and far from expiry: valid, no new token.
    /// 4. Valid and near expiry: a new session is persisted and its token
    ///    returned. The presented session stays usable.
    pub async fn validate_and_rotate(
        &self,
        user_id: UserId,
        refresh_token: &str,
    ) -> Result<RefreshCheck, AuthError> {
        if !self.session_exists(refresh_token).await? {
            tracing::debug!(user_id = %user_id, "Refresh token has no session");
            return Err(AuthError::RefreshTokenNotFound);
        }

        if !self.codec.validate(refresh_token, user_id)? {
            return Ok(RefreshCheck::invalid());
        }

        if !self.codec.is_near_expiry(refresh_token)? {
            return Ok(RefreshCheck::valid());
        }

        let new_token = self.create_session(user_id).await?;
        tracing::info!(user_id = %user_id, "Refresh token rotated");
        Ok(RefreshCheck::rotated(new_token))
    }

    /// All stored sessions for a user, newest first
    pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<Session>, AuthError> {
        let rows = self.repo.find_by_user_id(user_id.get()).await.map_err(|e| {
            tracing::error!("Failed to list sessions: {}", e);
            AuthError::Internal("failed to list sessions".to_string())
        })?;
        Ok(rows.into_iter().map(Session::from).collect())
    }
}

impl<R: SessionRepository> std::fmt::Debug for SessionManager<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
