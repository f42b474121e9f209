//! Room sessions for planpoker.
//!
//! A [`RoomSession`] lets one participant create, join and leave rooms,
//! vote, and move the room through its phases. Every participant in a room
//! runs its own session against the same store; the store's notifications
//! keep each session's [`RoomSnapshot`] in sync.
//!
//! # Key types
//!
//! - [`RoomSession`] — commands plus the observable snapshot
//! - [`RoomSnapshot`] — the room as the session last saw it
//! - [`RoomPhase`] — voting / revealing / revealed, derived from meta
//! - [`RoomConfig`] — deck fallback, countdown lengths, transition policy
//!
//! # A round, end to end
//!
//! ```text
//! create_room / join_room ──→ Voting ──start_reveal_countdown──→ Revealing
//!        ↑                      ↑                                    │
//!        │                      └──── start_round_countdown ─────────┤
//!        │                                                         reveal
//!        └──────────── start_new_voting ←──────── Revealed ←─────────┘
//! ```
//!
//! The phase is never stored; it is derived from the meta record's
//! `revealed` flag and countdown timestamps, so every session computes the
//! same phase from the same data.
//!
//! # Who drives the room?
//!
//! Nobody in particular. There is no host: every mutator is a plain store
//! write any participant may issue, and concurrent callers simply race
//! (last write wins per field). [`TransitionPolicy::Strict`] adds a local
//! check against the snapshot's phase, which catches a stale button press
//! but is not a lock.

mod config;
mod error;
mod session;
mod snapshot;

pub use config::{PhaseTransition, RoomConfig, RoomPhase, TransitionPolicy};
pub use error::RoomError;
pub use session::RoomSession;
pub use snapshot::{Membership, RoomSnapshot, VoteView};
