//! Messages delivered to WebSocket clients.

pub mod envelope;

pub use envelope::EventEnvelope;
