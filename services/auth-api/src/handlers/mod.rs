//! HTTP handlers

mod health;

pub use health::{health, ready};
