//! The explicit session context.
//!
//! Everything a room session needs from "the environment" lives here
//! instead of in process-wide globals:
//! - WHICH store it talks to
//! - WHO the local participant is (once signed in)
//! - WHAT time it is
//!
//! A context is created at session start, signed in once the identity
//! provider's handshake completes, and shut down explicitly.

use std::sync::Arc;
use std::time::Duration;

use planpoker_protocol::{ParticipantId, Timestamp};
use planpoker_store::Store;

use crate::{Clock, IdentityProvider, SessionError, SystemClock};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for the identity provider's handshake.
    ///
    /// Default: 10 seconds.
    pub sign_in_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sign_in_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityState
// ---------------------------------------------------------------------------

/// Where the context is in its identity lifecycle.
///
/// ```text
///   Pending ──(sign_in)──→ SignedIn ──(shutdown)──→ ShutDown
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// The handshake has not completed yet.
    Pending,

    /// The handshake completed with this identity.
    SignedIn(ParticipantId),

    /// The context was shut down; no further identity-bound work.
    ShutDown,
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// Store handle, clock and identity for one client session.
pub struct SessionContext<S: Store> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    identity: IdentityState,
    config: SessionConfig,
}

impl<S: Store> SessionContext<S> {
    /// Creates a context that is not signed in yet, using the system clock.
    pub fn new(store: Arc<S>, config: SessionConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            identity: IdentityState::Pending,
            config,
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the identity provider's handshake and records the result.
    ///
    /// Signing in again replaces the previous identity.
    ///
    /// # Errors
    /// - [`SessionError::SignInTimedOut`] if the provider does not answer
    ///   within `config.sign_in_timeout`
    /// - whatever the provider returns
    pub async fn sign_in<P: IdentityProvider>(
        &mut self,
        provider: &P,
    ) -> Result<ParticipantId, SessionError> {
        let timeout = self.config.sign_in_timeout;
        let id = tokio::time::timeout(timeout, provider.sign_in())
            .await
            .map_err(|_| SessionError::SignInTimedOut(timeout))??;

        tracing::info!(participant = %id, "signed in");
        self.identity = IdentityState::SignedIn(id.clone());
        Ok(id)
    }

    /// Ends the session. Identity-bound operations fail afterwards.
    pub fn shutdown(&mut self) {
        if let IdentityState::SignedIn(id) = &self.identity {
            tracing::info!(participant = %id, "session shut down");
        }
        self.identity = IdentityState::ShutDown;
    }

    /// The local participant, if signed in.
    pub fn participant(&self) -> Option<&ParticipantId> {
        match &self.identity {
            IdentityState::SignedIn(id) => Some(id),
            _ => None,
        }
    }

    /// The local participant, or [`SessionError::NotSignedIn`].
    pub fn require_participant(&self) -> Result<&ParticipantId, SessionError> {
        self.participant().ok_or(SessionError::NotSignedIn)
    }

    pub fn identity(&self) -> &IdentityState {
        &self.identity
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

// =========================================================================
// Tests
// =========================================================================
