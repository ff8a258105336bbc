//! # sessiongate-database
//!
//! The [`SessionStore`] abstraction and its two implementations: a
//! PostgreSQL store for production and an in-memory store for tests and
//! single-node development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemorySessionStore;
pub use provider::connect_store;
pub use repositories::PgSessionStore;
pub use store::SessionStore;
