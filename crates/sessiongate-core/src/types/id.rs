//! Newtype wrappers for the two identifiers the session limiter deals in.
//!
//! Both are opaque strings issued by the identity provider: the account id
//! is the token subject, the session id is the per-login `sid`. Neither is
//! generated locally, so construction only validates shape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw identifier.
            ///
            /// Rejects empty or whitespace-only values and values containing
            /// control characters.
            pub fn parse(raw: impl Into<String>) -> Result<Self, AppError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(AppError::invalid_request(concat!($label, " must not be empty")));
                }
                if raw.chars().any(char::is_control) {
                    return Err(AppError::invalid_request(concat!(
                        $label,
                        " contains control characters"
                    )));
                }
                Ok(Self(raw))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Length of the identifier in bytes.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the identifier is empty. Never true once parsed.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// Identity-provider subject owning zero or more sessions.
    AccountId,
    "account_id"
);

define_string_id!(
    /// Provider-issued identifier of one browser login.
    SessionId,
    "session_id"
);
