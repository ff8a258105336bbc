//! Core traits defined in `sessiongate-core` and implemented by other crates.

pub mod notifier;

pub use notifier::SessionNotifier;
