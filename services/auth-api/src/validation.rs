//! Request validation at the gRPC boundary
//!
//! Every check here runs before the auth core is called. Failures carry a
//! message safe to return to the client.

use tonic::{Code, Status};

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 4;

/// Maximum email length accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

/// Rejected request field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    code: Code,
    message: String,
}

impl ValidationError {
    fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: Code::InvalidArgument,
            message: message.into(),
        }
    }

    fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            code: Code::Unauthenticated,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Code {
        self.code
    }
}

impl From<ValidationError> for Status {
    fn from(err: ValidationError) -> Self {
        Status::new(err.code, err.message)
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_register(email: &str, password: &str) -> ValidationResult {
    require(email, "email is required")?;
    validate_email(email)?;
    validate_password_len(password, "password")
}

pub fn validate_login(email: &str, password: &str) -> ValidationResult {
    require(email, "email is required")?;
    require(password, "password is required")
}

pub fn validate_logout(refresh_token: &str) -> ValidationResult {
    require(refresh_token, "refresh token is required")
}

pub fn validate_refresh_check(user_id: i64, refresh_token: &str) -> ValidationResult {
    if user_id == 0 {
        return Err(ValidationError::invalid_argument("user_id is required"));
    }
    if refresh_token.is_empty() {
        return Err(ValidationError::unauthenticated("refresh token is required"));
    }
    Ok(())
}

pub fn validate_change_password(
    email: &str,
    old_password: &str,
    new_password: &str,
    refresh_token: &str,
) -> ValidationResult {
    require(email, "email is required")?;
    require(refresh_token, "refresh token is required")?;
    validate_password_len(old_password, "old password")?;
    validate_password_len(new_password, "new password")?;

    if new_password == old_password {
        return Err(ValidationError::invalid_argument(
            "new password must be different from old password",
        ));
    }
    Ok(())
}

fn require(value: &str, message: &'static str) -> ValidationResult {
    if value.is_empty() {
        return Err(ValidationError::invalid_argument(message));
    }
    Ok(())
}

fn validate_password_len(password: &str, field: &str) -> ValidationResult {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::invalid_argument(format!(
            "{field} must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Syntactic check of a bare `local@domain` address.
///
/// Accepts the dot-atom form: printable ASCII atoms separated by single
/// dots on both sides, and at least one label in the domain.
pub fn validate_email(email: &str) -> ValidationResult {
    let invalid = || ValidationError::invalid_argument("invalid email address");

    if email.len() > MAX_EMAIL_LEN {
        return Err(invalid());
    }

    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;

    if !is_dot_atom(local, is_atext) {
        return Err(invalid());
    }

    if !is_dot_atom(domain, |c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid());
    }

    if domain
        .split('.')
        .any(|label| label.starts_with('-') || label.ends_with('-'))
    {
        return Err(invalid());
    }

    Ok(())
}

fn is_dot_atom(s: &str, allowed: impl Fn(char) -> bool) -> bool {
    !s.is_empty()
        && s
            .split('.')
            .all(|atom| !atom.is_empty() && atom.chars().all(&allowed))
}

// RFC 5322 atext
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}
