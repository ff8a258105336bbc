//! Per-account pub/sub channels.

pub mod registry;
pub mod subscription;

pub use registry::ChannelRegistry;
pub use subscription::AccountSubscription;
