//! JSON body extractor that validates and reports failures as `InvalidRequest`.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use sessiongate_core::error::AppError;

use crate::error::ApiError;

/// Like `Json<T>`, but runs `T::validate` and answers with the API error body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::invalid_request(e.to_string()))?;
        Ok(Self(value))
    }
}
