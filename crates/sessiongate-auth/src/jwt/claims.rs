//! Claims read from identity-provider access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sessiongate_core::error::AppError;
use sessiongate_core::types::AccountId;

/// The subset of access-token claims the service relies on.
///
/// `iss`, `aud` and `exp` are checked by the verifier before these claims
/// are handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: Option<i64>,
    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,
    /// Provider session id, present on some token shapes.
    #[serde(default)]
    pub sid: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl Claims {
    /// The verified account id.
    ///
    /// An empty subject is rejected as `InvalidRequest`.
    pub fn account_id(&self) -> Result<AccountId, AppError> {
        AccountId::parse(self.sub.as_str())
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Whether `scope` grants `wanted`.
    pub fn has_scope(&self, wanted: &str) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|s| s.split_whitespace().any(|granted| granted == wanted))
    }
}
