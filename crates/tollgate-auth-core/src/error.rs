//! Auth errors

use thiserror::Error;

/// Coarse classification of an [`AuthError`], independent of transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User or session absent
    NotFound,
    /// Duplicate user
    Conflict,
    /// Wrong password, or an untrustworthy token
    Unauthorized,
    /// Required configuration absent or invalid
    Configuration,
    /// Hashing, codec or store failure
    Internal,
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// A user with this email is already registered
    #[error("user already exists")]
    UserExists,

    /// No user with this email, or no session for this token
    #[error("user not found")]
    UserNotFound,

    /// Password does not match the stored hash
    #[error("wrong password")]
    WrongPassword,

    /// No session row for the presented refresh token
    #[error("refresh token not found")]
    RefreshTokenNotFound,

    /// Token is malformed, badly signed, or its claims are unusable
    #[error("invalid token")]
    InvalidToken,

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound | Self::RefreshTokenNotFound => ErrorKind::NotFound,
            Self::UserExists => ErrorKind::Conflict,
            Self::WrongPassword | Self::InvalidToken => ErrorKind::Unauthorized,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserExists => "USER_EXISTS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::RefreshTokenNotFound => "REFRESH_TOKEN_NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AuthError::UserExists.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::RefreshTokenNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::WrongPassword.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::InvalidToken.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            AuthError::Configuration("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(AuthError::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            AuthError::UserExists,
            AuthError::UserNotFound,
            AuthError::WrongPassword,
            AuthError::RefreshTokenNotFound,
            AuthError::InvalidToken,
            AuthError::Configuration("x".into()),
            AuthError::Internal("x".into()),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.error_code()).collect();
        assert_eq!(codes.len(), errors.len());
    }
}
