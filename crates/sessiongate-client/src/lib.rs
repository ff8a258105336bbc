//! # sessiongate-client
//!
//! Browser-side half of the session limiter: a per-tab [`Reconciler`]
//! that registers after login, resolves device conflicts by eviction,
//! polls liveness and reacts to eviction events. Talks to the server
//! through the [`SessionApi`] trait; [`HttpSessionApi`] and
//! [`EventListener`] are the network implementations.

pub mod api;
pub mod error;
pub mod http;
pub mod listener;
pub mod reconciler;

pub use api::{DeviceSession, RegisterReply, RemoteStatus, SessionApi};
pub use error::ClientError;
pub use http::HttpSessionApi;
pub use listener::EventListener;
pub use reconciler::{Reconciler, ReconcilerState, TerminationReason};
pub use sessiongate_realtime::EventEnvelope;
