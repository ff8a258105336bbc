//! Identity-provider key set fetching and caching.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use moka::future::Cache;
use tracing::{debug, info};

use sessiongate_core::error::{AppError, ErrorKind};

/// Fetches the provider's JWKS and keeps it for a configurable time.
///
/// A token signed with a key id missing from the cached set triggers one
/// refetch, which picks up provider key rotation without waiting for the
/// cache to expire.
#[derive(Clone)]
pub struct JwksCache {
    url: String,
    http: reqwest::Client,
    cache: Cache<String, Arc<JwkSet>>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache").field("url", &self.url).finish()
    }
}

impl JwksCache {
    /// Creates a cache for the key set at `url`.
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    #[cfg(test)]
    async fn prime(&self, keys: JwkSet) {
        self.cache.insert(self.url.clone(), Arc::new(keys)).await;
    }

    /// Resolve the decoding key for `kid`, refetching once if it is unknown.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AppError> {
        let keys = self.keys().await?;
        if let Ok(key) = select_key(&keys, kid) {
            return Ok(key);
        }

        debug!(kid = %kid, "Unknown key id, refreshing key set");
        self.cache.invalidate(&self.url).await;
        let keys = self.keys().await?;
        select_key(&keys, kid)
    }

    async fn keys(&self) -> Result<Arc<JwkSet>, AppError> {
        self.cache
            .try_get_with(self.url.clone(), self.fetch())
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    async fn fetch(&self) -> Result<Arc<JwkSet>, AppError> {
        info!(url = %self.url, "Fetching JWKS");

        let response = self.http.get(&self.url).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::IdentityProviderUnavailable,
                "Failed to fetch JWKS",
                e,
            )
        })?;

        if !response.status().is_success() {
            return Err(AppError::identity_provider_unavailable(format!(
                "JWKS endpoint returned status: {}",
                response.status()
            )));
        }

        let keys: JwkSet = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::IdentityProviderUnavailable,
                "Failed to parse JWKS",
                e,
            )
        })?;
        Ok(Arc::new(keys))
    }
}

/// Find `kid` in `keys` and build a decoding key from it.
pub(crate) fn select_key(keys: &JwkSet, kid: &str) -> Result<DecodingKey, AppError> {
    let jwk = keys
        .find(kid)
        .ok_or_else(|| AppError::unauthorized(format!("Unknown signing key: {kid}")))?;
    DecodingKey::from_jwk(jwk)
        .map_err(|e| AppError::with_source(ErrorKind::Unauthorized, "Unusable signing key", e))
}
