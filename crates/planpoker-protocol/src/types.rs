//! Records stored under `rooms/`.
//!
//! Field names on the wire are camelCase. Optional fields are omitted (or
//! null) when unset; the store drops nulls, so an absent field and a null
//! field read back the same way.

use std::fmt;

use planpoker_store::is_valid_key;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;
use crate::deck::ensure_deck_or;
use crate::naming::slugify;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a room: the slug of its display name.
///
/// Always non-empty and made only of `[a-z0-9-]`, so it is safe as a store
/// key and in URLs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Derives the room id from a free-text room name. Returns `None` when
    /// the name has no usable characters.
    pub fn from_name(name: &str) -> Option<Self> {
        let slug = slugify(name);
        if slug.is_empty() { None } else { Some(Self(slug)) }
    }

    /// Accepts `raw` only if it is already a slug.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if !raw.is_empty() && slugify(raw) == raw {
            Ok(Self(raw.to_string()))
        } else {
            Err(ProtocolError::InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identity of one participant session, issued by the identity
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Accepts any string that is usable as a single store key.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ProtocolError> {
        let raw = raw.into();
        if is_valid_key(&raw) {
            Ok(Self(raw))
        } else {
            Err(ProtocolError::InvalidIdentifier(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomMeta
// ---------------------------------------------------------------------------

/// Room-level state shared by every participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMeta {
    /// When the room was created.
    pub created_at: Timestamp,

    /// The display name as typed by the creator.
    pub name: String,

    /// Permitted vote labels, in display order. Never empty once
    /// [`normalized`](Self::normalized).
    #[serde(default)]
    pub deck: Vec<String>,

    /// Whether votes of the current round are visible.
    #[serde(default)]
    pub revealed: bool,

    /// Start of the vote-entry countdown, if one is running.
    #[serde(default)]
    pub countdown_start: Option<Timestamp>,

    /// Start of the countdown to reveal, if one is running.
    #[serde(default)]
    pub reveal_countdown_start: Option<Timestamp>,

    /// Identifies the current round. Changes exactly when votes are
    /// reset.
    pub round_id: Timestamp,
}

impl RoomMeta {
    /// A fresh, unrevealed room created at `now`.
    pub fn new(name: impl Into<String>, deck: Vec<String>, now: Timestamp) -> Self {
        Self {
            created_at: now,
            name: name.into(),
            deck,
            revealed: false,
            countdown_start: None,
            reveal_countdown_start: None,
            round_id: now,
        }
    }

    /// Replaces an empty deck with `fallback`.
    pub fn normalized(mut self, fallback: &[String]) -> Self {
        let deck = std::mem::take(&mut self.deck);
        self.deck = ensure_deck_or(Some(deck), fallback.iter().cloned());
        self
    }

    /// Returns `true` if `label` is one of the deck's cards.
    pub fn has_card(&self, label: &str) -> bool {
        self.deck.iter().any(|card| card == label)
    }

    /// The round id to use for the next round started at `now`.
    ///
    /// Strictly greater than the current one even if the clock has not
    /// advanced.
    pub fn next_round_id(&self, now: Timestamp) -> Timestamp {
        now.max(self.round_id.saturating_add(1))
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One participant's record within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name, as entered when joining.
    pub name: String,

    /// Current vote; `None` until the participant picks a card.
    #[serde(default)]
    pub vote: Option<String>,

    /// When the participant (re)joined.
    pub joined_at: Timestamp,
}

impl Player {
    pub fn has_voted(&self) -> bool {
        self.vote.is_some()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_room_id_from_name() {
        assert_eq!(RoomId::from_name("Sprint 42").unwrap().as_str(), "sprint-42");
        assert!(RoomId::from_name("   ").is_none());
    }

    #[test]
    fn test_room_id_parse_only_accepts_slugs() {
        assert!(RoomId::parse("sprint-42").is_ok());
        assert!(RoomId::parse("Sprint 42").is_err());
        assert!(RoomId::parse("").is_err());
        assert!(RoomId::parse("-edge").is_err());
    }

    #[test]
    fn test_participant_id_rejects_path_characters() {
        assert!(ParticipantId::parse("u1").is_ok());
        assert!(ParticipantId::parse("a/b").is_err());
        assert!(ParticipantId::parse("").is_err());
    }

    #[test]
    fn test_room_meta_serializes_camel_case() {
        let meta = RoomMeta::new("Sprint", vec!["1".into()], 1_000);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["createdAt"], json!(1_000));
        assert_eq!(value["roundId"], json!(1_000));
        assert_eq!(value["revealed"], json!(false));
        assert_eq!(value["countdownStart"], json!(null));
    }

    #[test]
    fn test_room_meta_missing_optional_fields_default() {
        let meta: RoomMeta =
            serde_json::from_value(json!({"createdAt": 1, "name": "R", "roundId": 1})).unwrap();
        assert!(meta.deck.is_empty());
        assert!(!meta.revealed);
        assert_eq!(meta.countdown_start, None);
        assert_eq!(meta.reveal_countdown_start, None);
    }

    #[test]
    fn test_room_meta_normalized_fills_empty_deck() {
        let fallback = vec!["S".to_string(), "M".to_string()];
        let meta = RoomMeta::new("R", vec![], 1).normalized(&fallback);
        assert_eq!(meta.deck, fallback);
        assert!(meta.has_card("M"));
        assert!(!meta.has_card("XL"));
    }

    #[test]
    fn test_next_round_id_strictly_increases() {
        let meta = RoomMeta::new("R", vec![], 500);
        assert_eq!(meta.next_round_id(900), 900);
        assert_eq!(meta.next_round_id(500), 501);
        assert_eq!(meta.next_round_id(100), 501);
    }

    #[test]
    fn test_player_missing_vote_is_none() {
        let player: Player =
            serde_json::from_value(json!({"name": "Bob", "joinedAt": 7})).unwrap();
        assert_eq!(player.vote, None);
        assert!(!player.has_voted());
    }
}
