//! In-process store implementations.

pub mod store;

pub use store::MemorySessionStore;
