//! Domain events emitted by session operations.
//!
//! Events are handed to a [`SessionNotifier`](crate::traits::SessionNotifier)
//! and fanned out to every client subscribed to the owning account.

pub mod session;

pub use session::SessionEvent;
