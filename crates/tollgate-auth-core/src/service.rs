//! Auth service - ties together credential hashing, token issuance and the
//! session store into the account lifecycle operations

use std::sync::Arc;

use tollgate_db::{CreateUser, DbError, SessionRepository, UserRepository, UserRow};
use tollgate_types::{RefreshCheck, Session, UserId};

use crate::{
    config::AuthConfig, password::CredentialHasher, session::SessionManager, token::TokenCodec,
    AuthError,
};

/// Authentication service
///
/// Provides the lifecycle operations:
/// - Registration and login with email/password
/// - Refresh-token validation with rotation near expiry
/// - Logout and password change, both revoking a session
///
/// Holds no per-user state between calls; every decision is made against
/// the store.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    hasher: CredentialHasher,
    session_manager: SessionManager<S>,
    user_repo: Arc<U>,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    /// Create a new auth service
    pub fn new(
        config: AuthConfig,
        user_repo: Arc<U>,
        session_repo: Arc<S>,
    ) -> Result<Self, AuthError> {
        let hasher = CredentialHasher::new(&config.hashing)?;
        let session_manager = SessionManager::new(TokenCodec::new(&config), session_repo);

        Ok(Self {
            hasher,
            session_manager,
            user_repo,
        })
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a new user. No session is created.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let password_hash = self.hasher.hash_blocking(password).await?;

        let user = self
            .user_repo
            .create(CreateUser {
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation => AuthError::UserExists,
                e => {
                    tracing::error!("Failed to create user: {}", e);
                    AuthError::Internal("failed to create user".to_string())
                }
            })?;

        tracing::info!(user_id = user.user_id, "User registered");
        Ok(user.user_id())
    }

    /// Authenticate with email and password and open a new session.
    ///
    /// Returns the user id and a fresh refresh token. Other sessions of the
    /// user are left as they are.
    pub async fn login(&self, email: &str, password: &str) -> Result<(UserId, String), AuthError> {
        let user = self.find_user(email).await?;
        self.check_password(&user, password).await?;

        let refresh_token = self.session_manager.create_session(user.user_id()).await?;

        tracing::info!(user_id = user.user_id, "User logged in");
        Ok((user.user_id(), refresh_token))
    }

    /// Change a user's password and revoke the session for `refresh_token`.
    ///
    /// The password is updated before the session is looked at, so a token
    /// with no session still leaves the new password in place and reports
    /// [`AuthError::UserNotFound`].
    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let user = self.find_user(email).await?;
        self.check_password(&user, old_password).await?;

        let password_hash = self.hasher.hash_blocking(new_password).await?;
        self.user_repo
            .update_password_hash(email, &password_hash)
            .await
            .map_err(|e| match e {
                DbError::NotFound => AuthError::UserNotFound,
                e => {
                    tracing::error!("Failed to update password: {}", e);
                    AuthError::Internal("failed to update password".to_string())
                }
            })?;

        tracing::info!(user_id = user.user_id, "Password changed");
        self.session_manager.revoke(refresh_token).await
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Revoke the session holding exactly this token
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.session_manager.revoke(refresh_token).await?;
        tracing::info!("Session revoked");
        Ok(())
    }

    /// Check a refresh token for `user_id`, rotating it near expiry
    pub async fn is_refresh_token_valid(
        &self,
        user_id: UserId,
        refresh_token: &str,
    ) -> Result<RefreshCheck, AuthError> {
        self.session_manager
            .validate_and_rotate(user_id, refresh_token)
            .await
    }

    /// Stored sessions for a user, newest first
    pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<Session>, AuthError> {
        self.session_manager.list_sessions(user_id).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn find_user(&self, email: &str) -> Result<UserRow, AuthError> {
        self.user_repo
            .find_by_email(email)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user: {}", e);
                AuthError::Internal("failed to find user".to_string())
            })?
            .ok_or(AuthError::UserNotFound)
    }

    async fn check_password(&self, user: &UserRow, password: &str) -> Result<(), AuthError> {
        if self
            .hasher
            .verify_blocking(&user.password_hash, password)
            .await?
        {
            Ok(())
        } else {
            tracing::debug!(user_id = user.user_id, "Password mismatch");
            Err(AuthError::WrongPassword)
        }
    }
}

impl<U: UserRepository, S: SessionRepository> std::fmt::Debug for AuthService<U, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("sessions", &self.session_manager)
            .finish()
    }
}
