//! Access-token verification.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use tracing::warn;

use sessiongate_core::config::AuthConfig;
use sessiongate_core::error::AppError;

use super::claims::Claims;
use super::jwks::JwksCache;

#[derive(Clone)]
enum KeySource {
    /// Shared HMAC secret (development and tests).
    Shared(DecodingKey),
    /// Provider key set, selected by the token's `kid`.
    Jwks(JwksCache),
}

/// Verifies bearer tokens and yields their claims.
#[derive(Clone)]
pub struct JwtVerifier {
    keys: KeySource,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.keys {
            KeySource::Shared(_) => "hs256",
            KeySource::Jwks(_) => "jwks",
        };
        f.debug_struct("JwtVerifier")
            .field("mode", &mode)
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    /// Creates a verifier from auth configuration.
    ///
    /// A configured `hs256_secret` selects shared-secret verification;
    /// otherwise tokens are checked as RS256 against the provider's JWKS.
    pub fn new(config: &AuthConfig) -> Self {
        match config.hs256_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => {
                warn!("HS256 shared-secret token verification enabled; do not use in production");
                Self {
                    keys: KeySource::Shared(DecodingKey::from_secret(secret.as_bytes())),
                    validation: build_validation(Algorithm::HS256, config),
                }
            }
            None => Self::with_jwks(
                JwksCache::new(
                    config.resolved_jwks_url(),
                    Duration::from_secs(config.jwks_cache_ttl_seconds),
                ),
                config,
            ),
        }
    }

    /// Creates an RS256 verifier over an existing key set cache.
    pub fn with_jwks(cache: JwksCache, config: &AuthConfig) -> Self {
        Self {
            keys: KeySource::Jwks(cache),
            validation: build_validation(Algorithm::RS256, config),
        }
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Checks signature, expiry and, when configured, issuer and audience.
    pub async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let key = match &self.keys {
            KeySource::Shared(key) => key.clone(),
            KeySource::Jwks(cache) => {
                let header = decode_header(token)
                    .map_err(|_| AppError::unauthorized("Invalid token format"))?;
                let kid = header
                    .kid
                    .ok_or_else(|| AppError::unauthorized("Token header has no key id"))?;
                cache.decoding_key(&kid).await?
            }
        };

        let token_data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::unauthorized("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::unauthorized("Invalid token issuer")
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AppError::unauthorized("Invalid token audience")
                }
                _ => AppError::unauthorized(format!("Token validation failed: {e}")),
            }
        })?;

        Ok(token_data.claims)
    }
}

fn build_validation(algorithm: Algorithm, config: &AuthConfig) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.leeway = config.leeway_seconds;
    if !config.issuer.is_empty() {
        validation.set_issuer(&[config.issuer.as_str()]);
    }
    if config.audience.is_empty() {
        validation.validate_aud = false;
    } else {
        validation.set_audience(&[config.audience.as_str()]);
    }
    validation
}
