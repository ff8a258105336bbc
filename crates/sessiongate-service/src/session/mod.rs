//! Session lifecycle services.

pub mod device;
pub mod eviction;
pub mod service;

pub use eviction::EvictionService;
pub use service::{RegisterRequest, SessionService};
