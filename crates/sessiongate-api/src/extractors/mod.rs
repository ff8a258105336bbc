//! Custom Axum extractors.

pub mod auth;
pub mod client_ip;
pub mod json;
pub mod query;

pub use auth::AuthUser;
pub use json::ValidatedJson;
pub use query::ValidatedQuery;
