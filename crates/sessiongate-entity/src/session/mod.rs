//! Session domain entities.

pub mod model;
pub mod outcome;
pub mod status;

pub use model::{NewSession, Session};
pub use outcome::{EvictOutcome, Liveness, LogoutOutcome, RegisterOutcome};
pub use status::SessionStatus;
