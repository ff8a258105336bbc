//! # sessiongate-core
//!
//! Core crate for SessionGate. Contains configuration schemas, the unified
//! error system, session domain events, the session limit type, and the
//! notifier trait implemented by the real-time crate.
//!
//! This crate has **no** internal dependencies on other SessionGate crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
