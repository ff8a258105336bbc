//! # sessiongate-realtime
//!
//! One broadcast channel per account, named `{prefix}:{account_id}`.
//! Eviction events published on an account's channel reach every client of
//! that account currently subscribed; nothing is replayed to late joiners.

pub mod channel;
pub mod connection;
pub mod message;
pub mod notifier;
pub mod server;

pub use channel::{AccountSubscription, ChannelRegistry};
pub use connection::ConnectionPool;
pub use message::EventEnvelope;
pub use notifier::RealtimeNotifier;
pub use server::RealtimeEngine;
