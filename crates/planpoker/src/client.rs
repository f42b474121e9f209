//! `ClientBuilder`: from a store handle to a signed-in room session.

use std::sync::Arc;

use planpoker_room::{RoomConfig, RoomSession};
use planpoker_session::{AnonymousIdentity, Clock, IdentityProvider, SessionConfig, SessionContext};
use planpoker_store::Store;

use crate::PlanPokerError;

/// Builder for configuring and signing in a room session.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use planpoker::prelude::*;
///
/// # async fn run() -> Result<(), PlanPokerError> {
/// let store = Arc::new(MemoryStore::new());
/// let mut session = ClientBuilder::new()
///     .connect(store, &AnonymousIdentity)
///     .await?;
/// let room_id = session.create_room("Sprint 42", "Alice", None).await?;
/// # let _ = room_id;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    room_config: RoomConfig,
    session_config: SessionConfig,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    /// Creates a builder with default settings and the system clock.
    pub fn new() -> Self {
        Self {
            room_config: RoomConfig::default(),
            session_config: SessionConfig::default(),
            clock: None,
        }
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Replaces the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Signs in through `provider` and returns a session on `store`.
    ///
    /// # Errors
    /// [`PlanPokerError::Session`] if sign-in fails or times out.
    pub async fn connect<S, P>(
        self,
        store: Arc<S>,
        provider: &P,
    ) -> Result<RoomSession<S>, PlanPokerError>
    where
        S: Store,
        P: IdentityProvider,
    {
        let mut ctx = SessionContext::new(store, self.session_config);
        if let Some(clock) = self.clock {
            ctx = ctx.with_clock(clock);
        }
        let participant = ctx.sign_in(provider).await?;
        tracing::debug!(%participant, "client connected");

        Ok(RoomSession::new(ctx, self.room_config))
    }

    /// Like [`connect`](Self::connect), signing in anonymously.
    pub async fn connect_anonymous<S: Store>(
        self,
        store: Arc<S>,
    ) -> Result<RoomSession<S>, PlanPokerError> {
        self.connect(store, &AnonymousIdentity).await
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
