//! # sessiongate-entity
//!
//! Domain entity models for SessionGate. `Session` mirrors a row of the
//! `active_sessions` table; the remaining types are value objects returned
//! by the session store and the session service.

pub mod device;
pub mod session;
