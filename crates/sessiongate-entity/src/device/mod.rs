//! Device description derived from a client-reported User-Agent.
//!
//! The result is display metadata only. It never takes part in any
//! uniqueness or authorization decision.

pub mod user_agent;

pub use user_agent::{describe_user_agent, DeviceInfo};
