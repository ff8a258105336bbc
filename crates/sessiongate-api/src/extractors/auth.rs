//! `AuthUser` extractor: verifies the bearer token and builds the request context.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;

use sessiongate_core::error::AppError;
use sessiongate_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

use super::client_ip::client_ip;

/// Extracted authenticated account context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.verifier.verify(token).await?;
        let account_id = claims.account_id()?;

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty());

        Ok(AuthUser(RequestContext::new(
            account_id,
            client_ip(parts),
            user_agent,
        )))
    }
}
