//! Tollgate Auth Core - Session & credential lifecycle
//!
//! Password hashing, refresh-token issuance and validation, proactive
//! rotation near expiry, and revocation on logout or password change.
//! Persistence goes through the repository traits in `tollgate-db`.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod token;

pub use config::*;
pub use error::*;
pub use password::CredentialHasher;
pub use service::*;
pub use session::SessionManager;
pub use token::{RefreshClaims, TokenCodec};
