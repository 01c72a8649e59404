//! Mapping of auth core errors to gRPC statuses.
//!
//! The same core error maps differently depending on the call: a wrong
//! password is `Unauthenticated` on login but `InvalidArgument` on password
//! change. Internal details are logged and replaced by a generic message.

use tollgate_auth_core::AuthError;
use tonic::Status;

/// gRPC operation, for error mapping and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Logout,
    IsRefreshTokenValid,
    ChangePassword,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::IsRefreshTokenValid => "is_refresh_token_valid",
            Self::ChangePassword => "change_password",
        }
    }

    fn internal_message(self) -> &'static str {
        match self {
            Self::Register => "failed to register user",
            Self::Login => "failed to log in user",
            Self::Logout => "failed to log out user",
            Self::IsRefreshTokenValid => "failed to check refresh token validity",
            Self::ChangePassword => "failed to change password",
        }
    }
}

/// Convert a core error raised by `op` into the status returned to the client
pub fn to_status(op: Operation, err: AuthError) -> Status {
    use Operation::*;

    match (op, &err) {
        (Register, AuthError::UserExists) => Status::already_exists("user already exists"),

        (Login | Logout | IsRefreshTokenValid | ChangePassword, AuthError::UserNotFound) => {
            Status::not_found("user not found")
        }

        (Login, AuthError::WrongPassword) => Status::unauthenticated("wrong password"),
        (ChangePassword, AuthError::WrongPassword) => Status::invalid_argument("wrong password"),

        (IsRefreshTokenValid, AuthError::InvalidToken | AuthError::RefreshTokenNotFound) => {
            Status::unauthenticated("invalid refresh token")
        }

        _ => {
            tracing::error!(
                operation = op.as_str(),
                code = err.error_code(),
                error = %err,
                "Request failed"
            );
            Status::internal(op.internal_message())
        }
    }
}
