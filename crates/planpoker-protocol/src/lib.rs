//! Room data model for planpoker.
//!
//! This crate defines what is stored and where:
//!
//! - **Types** ([`RoomMeta`], [`Player`], [`RoomId`], [`ParticipantId`]) —
//!   the records shared through the store.
//! - **Layout** ([`layout`]) — the store paths those records live at.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how records become store
//!   values and back.
//! - **Leaf utilities** — [`slugify`], [`ensure_deck`], [`display_name`].
//!
//! # Architecture
//!
//! The protocol layer sits between the store (raw JSON trees) and the room
//! session (typed snapshots). It doesn't know about subscriptions or
//! sessions; it only knows what a room looks like on disk and how to
//! convert it.
//!
//! ```text
//! Store (serde_json::Value) → Protocol (RoomMeta, Player) → Room (RoomSnapshot)
//! ```
//!
//! Store values written by other clients may be partial or malformed.
//! Decoding is strict, so callers decide per record whether to skip or
//! keep the last good value.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

// `layout`, `deck`, `display` and `naming` are public so their free
// functions can be called by path (`layout::meta(&room)`); the rest is
// re-exported below.

mod codec;
pub mod deck;
pub mod display;
mod error;
pub mod layout;
pub mod naming;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{Codec, JsonCodec};
pub use deck::{DEFAULT_DECK, default_deck, ensure_deck, ensure_deck_or};
pub use display::display_name;
pub use error::ProtocolError;
pub use naming::slugify;
pub use types::{ParticipantId, Player, RoomId, RoomMeta, Timestamp};
