//! # planpoker
//!
//! Planning-poker rooms on top of a real-time key-value store.
//!
//! Every participant runs a [`RoomSession`](planpoker_room::RoomSession)
//! against the same store. Room state lives in the store under
//! `rooms/{roomId}`; each session subscribes to it and keeps a local
//! snapshot for display, while commands (vote, reveal, start a new round)
//! are plain store writes.
//!
//! ## How the crates fit
//!
//! ```text
//! planpoker (this crate)  ← ClientBuilder, logging, re-exports
//!     ↓
//! planpoker-room          ← RoomSession, RoomSnapshot, phases
//!     ↓
//! planpoker-session       ← identity, clock, SessionContext
//!     ↓
//! planpoker-protocol      ← RoomMeta, Player, store layout, codec
//!     ↓
//! planpoker-store         ← Store trait, MemoryStore
//! ```
//!
//! Most applications only need [`prelude`]. The member crates are also
//! re-exported by name ([`room`], [`session`], ...) for anything the
//! prelude leaves out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use planpoker::prelude::*;
//!
//! # async fn run() -> Result<(), PlanPokerError> {
//! let store = Arc::new(MemoryStore::new());
//! let mut session = ClientBuilder::new().connect_anonymous(store).await?;
//! session.create_room("Sprint 42", "Alice", None).await?;
//! session.vote(Some("5")).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod logging;

pub use client::ClientBuilder;
pub use error::PlanPokerError;

pub use planpoker_protocol as protocol;
pub use planpoker_room as room;
pub use planpoker_session as session;
pub use planpoker_store as store;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::logging::init_tracing;
    pub use crate::{ClientBuilder, PlanPokerError};

    pub use planpoker_protocol::{
        DEFAULT_DECK, ParticipantId, Player, RoomId, RoomMeta, display_name, ensure_deck,
        slugify,
    };
    pub use planpoker_room::{
        Membership, PhaseTransition, RoomConfig, RoomPhase, RoomSession, RoomSnapshot,
        TransitionPolicy, VoteView,
    };
    pub use planpoker_session::{
        AnonymousIdentity, Clock, IdentityProvider, ManualClock, SessionConfig, StaticIdentity,
        SystemClock,
    };
    pub use planpoker_store::{MemoryStore, Store, StorePath, Subscription};
}
