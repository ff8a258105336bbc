//! Session status enum.

use serde::{Deserialize, Serialize};

/// Liveness of a stored session row.
///
/// `Inactive` means the owning browser logged out explicitly. Evicted
/// sessions are deleted outright and therefore have no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Counts against the account's cap.
    Active,
    /// Logged out; kept for audit, never counted.
    Inactive,
}

impl SessionStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = sessiongate_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(sessiongate_core::AppError::invalid_request(format!(
                "Invalid session status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        assert_eq!("ACTIVE".parse::<SessionStatus>().unwrap(), SessionStatus::Active);
        assert_eq!(SessionStatus::Inactive.to_string(), "inactive");
        assert!("revoked".parse::<SessionStatus>().is_err());
    }
}
