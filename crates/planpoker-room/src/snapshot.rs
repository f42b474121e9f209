//! Observable room state.

use std::collections::BTreeMap;

use planpoker_protocol::{ParticipantId, Player, RoomId, RoomMeta};

use crate::RoomPhase;

/// Where the local participant is in the join lifecycle.
///
/// ```text
/// Unjoined → Joining → Joined → Leaving → Unjoined
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Membership {
    #[default]
    Unjoined,
    Joining(RoomId),
    Joined(RoomId),
    Leaving(RoomId),
}

impl Membership {
    /// The room involved, in any state but `Unjoined`.
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Self::Unjoined => None,
            Self::Joining(room) | Self::Joined(room) | Self::Leaving(room) => Some(room),
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined(_))
    }
}

/// What a view may show about one participant's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteView<'a> {
    /// No vote yet (or no such participant).
    Missing,
    /// A vote exists but the round is not revealed.
    Hidden,
    /// The round is revealed.
    Shown(&'a str),
}

/// Everything the local session knows about its room.
///
/// Replaced piecemeal as store notifications arrive: `meta` on every meta
/// change, `players` wholesale on every players change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: Option<RoomId>,
    pub meta: Option<RoomMeta>,
    pub players: BTreeMap<ParticipantId, Player>,
    pub me: Option<ParticipantId>,
    pub my_name: String,
}

impl RoomSnapshot {
    /// Returns `true` once the session has a room, even before its meta
    /// arrives.
    pub fn is_joined(&self) -> bool {
        self.room_id.is_some()
    }

    pub fn phase(&self) -> Option<RoomPhase> {
        self.meta.as_ref().map(RoomPhase::of)
    }

    pub fn is_revealed(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.revealed)
    }

    /// The local participant's record, once the players snapshot has it.
    pub fn my_player(&self) -> Option<&Player> {
        self.me.as_ref().and_then(|me| self.players.get(me))
    }

    /// Players ordered by join time, ties broken by id.
    pub fn players_in_join_order(&self) -> Vec<(&ParticipantId, &Player)> {
        let mut players: Vec<_> = self.players.iter().collect();
        players.sort_by(|(a_id, a), (b_id, b)| {
            a.joined_at.cmp(&b.joined_at).then_with(|| a_id.cmp(b_id))
        });
        players
    }

    pub fn vote_view(&self, participant: &ParticipantId) -> VoteView<'_> {
        match self.players.get(participant).and_then(|p| p.vote.as_deref()) {
            None => VoteView::Missing,
            Some(_) if !self.is_revealed() => VoteView::Hidden,
            Some(vote) => VoteView::Shown(vote),
        }
    }

    pub fn votes_cast(&self) -> usize {
        self.players.values().filter(|p| p.has_voted()).count()
    }

    /// Returns `true` if there is at least one player and all have voted.
    pub fn all_voted(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(Player::has_voted)
    }
}

#[cfg(test)]
mod tests {
    use planpoker_protocol::default_deck;

    use super::*;

    fn pid(raw: &str) -> ParticipantId {
        ParticipantId::parse(raw).unwrap()
    }

    fn player(name: &str, vote: Option<&str>, joined_at: u64) -> Player {
        Player {
            name: name.into(),
            vote: vote.map(str::to_string),
            joined_at,
        }
    }

    fn snapshot(revealed: bool) -> RoomSnapshot {
        let mut meta = RoomMeta::new("R", default_deck(), 1);
        meta.revealed = revealed;
        let mut players = BTreeMap::new();
        players.insert(pid("b"), player("Bob", Some("8"), 20));
        players.insert(pid("a"), player("Alice", None, 10));
        RoomSnapshot {
            room_id: RoomId::from_name("R"),
            meta: Some(meta),
            players,
            me: Some(pid("a")),
            my_name: "Alice".into(),
        }
    }

    #[test]
    fn test_vote_view_hides_until_revealed() {
        let hidden = snapshot(false);
        assert_eq!(hidden.vote_view(&pid("b")), VoteView::Hidden);
        assert_eq!(hidden.vote_view(&pid("a")), VoteView::Missing);
        assert_eq!(hidden.vote_view(&pid("zz")), VoteView::Missing);

        let shown = snapshot(true);
        assert_eq!(shown.vote_view(&pid("b")), VoteView::Shown("8"));
    }

    #[test]
    fn test_players_in_join_order() {
        let snap = snapshot(false);
        let names: Vec<&str> = snap
            .players_in_join_order()
            .into_iter()
            .map(|(_, p)| p.name.as_str())
            .collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[test]
    fn test_vote_counts() {
        let mut snap = snapshot(false);
        assert_eq!(snap.votes_cast(), 1);
        assert!(!snap.all_voted());

        if let Some(alice) = snap.players.get_mut(&pid("a")) {
            alice.vote = Some("5".into());
        }
        assert!(snap.all_voted());
        assert!(!RoomSnapshot::default().all_voted());
    }

    #[test]
    fn test_my_player_and_phase() {
        let snap = snapshot(true);
        assert_eq!(snap.my_player().map(|p| p.name.as_str()), Some("Alice"));
        assert_eq!(snap.phase(), Some(RoomPhase::Revealed));
        assert_eq!(RoomSnapshot::default().phase(), None);
        assert!(snap.is_joined());
        assert!(!RoomSnapshot::default().is_joined());
    }

    #[test]
    fn test_membership_room() {
        let room = RoomId::parse("r").unwrap();
        assert_eq!(Membership::Unjoined.room(), None);
        assert_eq!(Membership::Leaving(room.clone()).room(), Some(&room));
        assert!(Membership::Joined(room.clone()).is_joined());
        assert!(!Membership::Joining(room).is_joined());
    }
}
