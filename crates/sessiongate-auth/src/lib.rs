//! # sessiongate-auth
//!
//! Verification of identity-provider access tokens and resolution of the
//! per-account concurrent-session cap.

pub mod jwt;
pub mod limiter;

pub use jwt::{Claims, JwtVerifier};
pub use limiter::SessionLimiter;
