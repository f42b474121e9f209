//! Where room records live in the store.
//!
//! ```text
//! rooms/{roomId}/meta                      -> RoomMeta
//! rooms/{roomId}/players/{participantId}   -> Player
//! ```

use planpoker_store::StorePath;

use crate::{ParticipantId, RoomId};

pub const ROOMS: &str = "rooms";
pub const META: &str = "meta";
pub const PLAYERS: &str = "players";

/// Field names inside a `RoomMeta` record.
pub mod meta_field {
    pub const DECK: &str = "deck";
    pub const REVEALED: &str = "revealed";
    pub const COUNTDOWN_START: &str = "countdownStart";
    pub const REVEAL_COUNTDOWN_START: &str = "revealCountdownStart";
    pub const ROUND_ID: &str = "roundId";
}

/// Field names inside a `Player` record.
pub mod player_field {
    pub const NAME: &str = "name";
    pub const VOTE: &str = "vote";
    pub const JOINED_AT: &str = "joinedAt";
}

pub fn room(room: &RoomId) -> StorePath {
    StorePath::root().child(ROOMS).child(room.as_str())
}

pub fn meta(room_id: &RoomId) -> StorePath {
    room(room_id).child(META)
}

pub fn meta_field(room_id: &RoomId, field: &str) -> StorePath {
    meta(room_id).child(field)
}

pub fn players(room_id: &RoomId) -> StorePath {
    room(room_id).child(PLAYERS)
}

pub fn player(room_id: &RoomId, participant: &ParticipantId) -> StorePath {
    players(room_id).child(participant.as_str())
}

pub fn player_vote(room_id: &RoomId, participant: &ParticipantId) -> StorePath {
    player(room_id, participant).child(player_field::VOTE)
}
