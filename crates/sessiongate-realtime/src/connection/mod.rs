//! WebSocket connection bookkeeping.

pub mod pool;

pub use pool::{ConnectionGuard, ConnectionId, ConnectionInfo, ConnectionPool};
