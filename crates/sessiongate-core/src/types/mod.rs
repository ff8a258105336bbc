//! Core type definitions used across the SessionGate workspace.

pub mod id;
pub mod session_limit;

pub use id::{AccountId, SessionId};
pub use session_limit::SessionLimit;
