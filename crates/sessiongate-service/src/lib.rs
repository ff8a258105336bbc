//! # sessiongate-service
//!
//! Business logic for the concurrent-session limiter. Services take every
//! dependency at construction time via `Arc` and every call takes a
//! [`RequestContext`] carrying the verified account.

pub mod context;
pub mod session;

pub use context::RequestContext;
pub use session::{EvictionService, RegisterRequest, SessionService};
