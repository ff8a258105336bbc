//! Query-string extractor with the same failure shape as [`ValidatedJson`].
//!
//! [`ValidatedJson`]: super::ValidatedJson

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use sessiongate_core::error::AppError;

use crate::error::ApiError;

/// Like `Query<T>`, but runs `T::validate` and answers with the API error body.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::invalid_request(e.to_string()))?;
        Ok(Self(value))
    }
}
