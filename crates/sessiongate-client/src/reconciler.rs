//! Per-tab state machine reconciling the local login with the server.
//!
//! ```text
//! Unchecked --login--> Trusted
//!     |                   |  status inactive/not_found, own eviction event, logout
//!     +--limit--> Conflict --evict + one retry--> Trusted
//!                                                 |
//!                                             Terminated (absorbing)
//! ```

use tracing::{debug, info, warn};

use sessiongate_core::types::SessionId;
use sessiongate_realtime::EventEnvelope;

use crate::api::{DeviceSession, RegisterReply, RemoteStatus, SessionApi};
use crate::error::ClientError;

/// Why a tab's session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Another device evicted this session.
    Evicted,
    /// The server reports the session inactive.
    Inactive,
    /// The server no longer knows the session.
    NotFound,
    /// The user logged out.
    LoggedOut,
}

/// Reconciler state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Logged in locally, not yet confirmed by the server.
    Unchecked,
    /// The account is at its cap; the user must pick a victim.
    Conflict {
        /// Active sessions offered for eviction.
        candidates: Vec<DeviceSession>,
        /// A victim already evicted whose follow-up registration failed.
        evicted: Option<SessionId>,
    },
    /// Registered with the server.
    Trusted,
    /// Ended; the tab must log out locally.
    Terminated {
        /// What ended it.
        reason: TerminationReason,
    },
}

impl ReconcilerState {
    fn name(&self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Conflict { .. } => "in conflict",
            Self::Trusted => "trusted",
            Self::Terminated { .. } => "terminated",
        }
    }
}

/// Drives one tab's session through [`ReconcilerState`].
///
/// Transport failures never move the state; only positive answers from
/// the server do.
#[derive(Debug)]
pub struct Reconciler<A> {
    api: A,
    session_id: SessionId,
    device_info: Option<String>,
    state: ReconcilerState,
}

impl<A: SessionApi> Reconciler<A> {
    /// Creates an unchecked reconciler for `session_id`.
    pub fn new(api: A, session_id: SessionId, device_info: Option<String>) -> Self {
        Self {
            api,
            session_id,
            device_info,
            state: ReconcilerState::Unchecked,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    /// This tab's session id.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Whether the tab must log out locally.
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ReconcilerState::Terminated { .. })
    }

    /// Register once after login.
    pub async fn login(&mut self) -> Result<&ReconcilerState, ClientError> {
        if self.state != ReconcilerState::Unchecked {
            return Err(ClientError::InvalidState(self.state.name()));
        }

        match self.register().await? {
            RegisterReply::Success => {
                info!(session_id = %self.session_id, "Session trusted");
                self.state = ReconcilerState::Trusted;
            }
            RegisterReply::LimitReached { active_devices } => {
                info!(
                    session_id = %self.session_id,
                    candidates = active_devices.len(),
                    "Device limit reached"
                );
                self.state = ReconcilerState::Conflict {
                    candidates: active_devices,
                    evicted: None,
                };
            }
        }
        Ok(&self.state)
    }

    /// Evict `victim` and retry registration exactly once.
    ///
    /// A failed eviction leaves the conflict as it was. When the eviction
    /// succeeded but the registration failed, the victim is remembered and
    /// calling again with it only retries the registration. A second
    /// `limit_reached` keeps the conflict with the fresh candidate list
    /// and fails with [`ClientError::LimitStillReached`].
    pub async fn resolve_conflict(
        &mut self,
        victim: &SessionId,
    ) -> Result<&ReconcilerState, ClientError> {
        let ReconcilerState::Conflict {
            candidates,
            evicted,
        } = &self.state
        else {
            return Err(ClientError::InvalidState(self.state.name()));
        };

        if evicted.as_ref() == Some(victim) {
            debug!(session_id = %self.session_id, victim = %victim, "Victim already evicted");
        } else {
            if !candidates.iter().any(|c| &c.session_id == victim) {
                return Err(ClientError::UnknownCandidate(victim.clone()));
            }

            self.api.evict(victim).await?;
            info!(session_id = %self.session_id, victim = %victim, "Evicted device");

            if let ReconcilerState::Conflict {
                candidates,
                evicted,
            } = &mut self.state
            {
                candidates.retain(|c| &c.session_id != victim);
                *evicted = Some(victim.clone());
            }
        }

        match self.register().await? {
            RegisterReply::Success => {
                self.state = ReconcilerState::Trusted;
                Ok(&self.state)
            }
            RegisterReply::LimitReached { active_devices } => {
                warn!(
                    session_id = %self.session_id,
                    candidates = active_devices.len(),
                    "Device limit still reached after eviction"
                );
                self.state = ReconcilerState::Conflict {
                    candidates: active_devices,
                    evicted: None,
                };
                Err(ClientError::LimitStillReached)
            }
        }
    }

    /// The victim evicted by an unfinished conflict resolution, if any.
    pub fn pending_eviction(&self) -> Option<&SessionId> {
        match &self.state {
            ReconcilerState::Conflict { evicted, .. } => evicted.as_ref(),
            _ => None,
        }
    }

    /// Poll the server for the own session's liveness.
    ///
    /// Only meaningful while trusted; other states are returned unchanged.
    pub async fn check_liveness(&mut self) -> Result<&ReconcilerState, ClientError> {
        if self.state != ReconcilerState::Trusted {
            return Ok(&self.state);
        }

        match self.api.status(&self.session_id).await {
            Ok(status) if status.is_terminated() => {
                let reason = if status == RemoteStatus::Inactive {
                    TerminationReason::Inactive
                } else {
                    TerminationReason::NotFound
                };
                info!(session_id = %self.session_id, ?reason, "Session ended on the server");
                self.state = ReconcilerState::Terminated { reason };
            }
            Ok(_) => {
                debug!(session_id = %self.session_id, "Session still active");
            }
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Liveness check failed, will retry");
                return Err(e);
            }
        }
        Ok(&self.state)
    }

    /// Apply a pushed event; only an eviction of the own session matters.
    pub fn on_event(&mut self, envelope: &EventEnvelope) -> &ReconcilerState {
        if self.is_terminated() {
            return &self.state;
        }
        if envelope.terminated_session_id().as_ref() == Some(&self.session_id) {
            info!(session_id = %self.session_id, "Session evicted by another device");
            self.state = ReconcilerState::Terminated {
                reason: TerminationReason::Evicted,
            };
        }
        &self.state
    }

    /// Explicit logout: mark the row inactive, then terminate.
    ///
    /// The tab terminates even when the server call fails; the error is
    /// still returned so the caller can report it.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = match self.state {
            ReconcilerState::Terminated { .. } => return Ok(()),
            ReconcilerState::Trusted => self.api.logout(&self.session_id).await,
            _ => Ok(()),
        };
        if let Err(e) = &result {
            warn!(session_id = %self.session_id, error = %e, "Logout call failed");
        }
        self.state = ReconcilerState::Terminated {
            reason: TerminationReason::LoggedOut,
        };
        result
    }

    async fn register(&self) -> Result<RegisterReply, ClientError> {
        self.api
            .register(&self.session_id, self.device_info.as_deref())
            .await
            .inspect_err(|e| {
                warn!(session_id = %self.session_id, error = %e, "Registration failed");
            })
    }
}
