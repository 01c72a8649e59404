//! Tollgate Types - Shared domain types
//!
//! This crate contains domain types used across Tollgate crates:
//! - User identity
//! - Session records and refresh-token lifetimes

pub mod session;
pub mod user;

pub use session::*;
pub use user::*;
