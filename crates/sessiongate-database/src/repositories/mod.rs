//! PostgreSQL-backed store implementations.

pub mod session;

pub use session::PgSessionStore;
