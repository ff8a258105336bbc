//! Token verification configuration.

use serde::{Deserialize, Serialize};

/// Identity-provider token verification settings.
///
/// Access tokens are RS256-signed by the identity provider and verified
/// against its published key set. When `hs256_secret` is set, tokens are
/// verified with that shared secret instead (development and tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected `iss` claim, e.g. `https://tenant.eu.auth0.com/`.
    #[serde(default)]
    pub issuer: String,
    /// Expected `aud` claim.
    #[serde(default)]
    pub audience: String,
    /// Key set URL. Derived from the issuer when empty.
    #[serde(default)]
    pub jwks_url: Option<String>,
    /// How long a fetched key set is trusted, in seconds.
    #[serde(default = "default_jwks_ttl")]
    pub jwks_cache_ttl_seconds: u64,
    /// Shared secret enabling HS256 verification.
    #[serde(default)]
    pub hs256_secret: Option<String>,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl AuthConfig {
    /// Returns the key set URL, derived from the issuer when not configured.
    pub fn resolved_jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => {
                let base = if self.issuer.ends_with('/') {
                    self.issuer.clone()
                } else {
                    format!("{}/", self.issuer)
                };
                format!("{base}.well-known/jwks.json")
            }
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: String::new(),
            jwks_url: None,
            jwks_cache_ttl_seconds: default_jwks_ttl(),
            hs256_secret: None,
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_jwks_ttl() -> u64 {
    3600
}

fn default_leeway() -> u64 {
    5
}
