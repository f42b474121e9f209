//! Room configuration and phase state machine.

use std::fmt;
use std::time::Duration;

use planpoker_protocol::{RoomMeta, Timestamp, default_deck};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for a room session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Deck used when a room is created without one, and substituted for
    /// an empty deck in received room data.
    pub default_deck: Vec<String>,

    /// Length of the vote-entry countdown.
    pub round_countdown: Duration,

    /// Length of the countdown before votes are revealed.
    pub reveal_countdown: Duration,

    /// Whether phase mutators are checked against the current phase.
    pub transitions: TransitionPolicy,

    /// Reject votes that are not in the room's deck.
    pub validate_votes: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_deck: default_deck(),
            round_countdown: Duration::from_secs(3),
            reveal_countdown: Duration::from_secs(3),
            transitions: TransitionPolicy::Permissive,
            validate_votes: false,
        }
    }
}

/// How phase mutators treat the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionPolicy {
    /// Any participant may call any mutator at any time.
    #[default]
    Permissive,
    /// Mutators are rejected unless [`RoomPhase::permits`] allows them.
    Strict,
}

// ---------------------------------------------------------------------------
// PhaseTransition
// ---------------------------------------------------------------------------

/// The four operations that move a room between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    StartRoundCountdown,
    StartRevealCountdown,
    Reveal,
    StartNewVoting,
}

impl fmt::Display for PhaseTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartRoundCountdown => write!(f, "start round countdown"),
            Self::StartRevealCountdown => write!(f, "start reveal countdown"),
            Self::Reveal => write!(f, "reveal"),
            Self::StartNewVoting => write!(f, "start new voting"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// The phase of the current round, derived from the room's meta record.
///
/// ```text
/// Voting ──(start reveal countdown)──→ Revealing ──(reveal)──→ Revealed
///    ↑                                                            │
///    └─────────────────(start new voting)─────────────────────────┘
/// ```
///
/// - **Voting**: votes are hidden and can change. An optional countdown
///   paces vote entry.
/// - **Revealing**: a countdown to reveal is running.
/// - **Revealed**: everyone's vote is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Voting { countdown_start: Option<Timestamp> },
    Revealing { started: Timestamp },
    Revealed,
}

impl RoomPhase {
    /// Reads the phase out of a meta record.
    pub fn of(meta: &RoomMeta) -> Self {
        if meta.revealed {
            Self::Revealed
        } else if let Some(started) = meta.reveal_countdown_start {
            Self::Revealing { started }
        } else {
            Self::Voting {
                countdown_start: meta.countdown_start,
            }
        }
    }

    /// Returns `true` if `transition` is valid from this phase under the
    /// strict policy.
    ///
    /// Starting the round countdown is allowed from every phase, since it
    /// also clears a pending or finished reveal.
    pub fn permits(self, transition: PhaseTransition) -> bool {
        matches!(
            (self, transition),
            (_, PhaseTransition::StartRoundCountdown)
                | (Self::Voting { .. }, PhaseTransition::StartRevealCountdown)
                | (Self::Revealing { .. }, PhaseTransition::Reveal)
                | (Self::Revealed, PhaseTransition::StartNewVoting)
        )
    }

    /// Time left on the running countdown, if there is one. Zero once it
    /// has run out.
    pub fn countdown_remaining(&self, now: Timestamp, config: &RoomConfig) -> Option<Duration> {
        let (started, length) = match *self {
            Self::Voting {
                countdown_start: Some(started),
            } => (started, config.round_countdown),
            Self::Revealing { started } => (started, config.reveal_countdown),
            _ => return None,
        };
        let elapsed = Duration::from_millis(now.saturating_sub(started));
        Some(length.saturating_sub(elapsed))
    }

    /// Returns `true` if a countdown is running and has run out.
    pub fn countdown_elapsed(&self, now: Timestamp, config: &RoomConfig) -> bool {
        self.countdown_remaining(now, config)
            .is_some_and(|left| left.is_zero())
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self, Self::Revealed)
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voting { .. } => write!(f, "voting"),
            Self::Revealing { .. } => write!(f, "revealing"),
            Self::Revealed => write!(f, "revealed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> RoomMeta {
        RoomMeta::new("R", default_deck(), 1_000)
    }

    #[test]
    fn test_phase_of_fresh_room_is_voting() {
        assert_eq!(
            RoomPhase::of(&meta()),
            RoomPhase::Voting {
                countdown_start: None
            }
        );
    }

    #[test]
    fn test_phase_of_reveal_countdown_is_revealing() {
        let mut m = meta();
        m.countdown_start = Some(1_100);
        m.reveal_countdown_start = Some(1_200);
        assert_eq!(RoomPhase::of(&m), RoomPhase::Revealing { started: 1_200 });
    }

    #[test]
    fn test_phase_of_revealed_wins_over_countdowns() {
        let mut m = meta();
        m.revealed = true;
        m.countdown_start = Some(1_100);
        assert_eq!(RoomPhase::of(&m), RoomPhase::Revealed);
    }

    #[test]
    fn test_permits_follows_cycle() {
        let voting = RoomPhase::Voting {
            countdown_start: None,
        };
        let revealing = RoomPhase::Revealing { started: 0 };

        assert!(voting.permits(PhaseTransition::StartRoundCountdown));
        assert!(voting.permits(PhaseTransition::StartRevealCountdown));
        assert!(!voting.permits(PhaseTransition::Reveal));
        assert!(!voting.permits(PhaseTransition::StartNewVoting));

        assert!(revealing.permits(PhaseTransition::Reveal));
        assert!(!revealing.permits(PhaseTransition::StartRevealCountdown));

        assert!(RoomPhase::Revealed.permits(PhaseTransition::StartNewVoting));
        assert!(!RoomPhase::Revealed.permits(PhaseTransition::Reveal));
        assert!(!RoomPhase::Revealed.permits(PhaseTransition::StartRevealCountdown));
    }

    #[test]
    fn test_permits_round_countdown_from_every_phase() {
        let phases = [
            RoomPhase::Voting {
                countdown_start: Some(5),
            },
            RoomPhase::Revealing { started: 5 },
            RoomPhase::Revealed,
        ];
        for phase in phases {
            assert!(phase.permits(PhaseTransition::StartRoundCountdown), "{phase:?}");
        }
    }

    #[test]
    fn test_countdown_remaining() {
        let config = RoomConfig::default();
        let phase = RoomPhase::Revealing { started: 10_000 };
        assert_eq!(
            phase.countdown_remaining(11_000, &config),
            Some(Duration::from_secs(2))
        );
        assert!(!phase.countdown_elapsed(11_000, &config));
        assert_eq!(
            phase.countdown_remaining(20_000, &config),
            Some(Duration::ZERO)
        );
        assert!(phase.countdown_elapsed(20_000, &config));
    }

    #[test]
    fn test_countdown_remaining_none_without_countdown() {
        let config = RoomConfig::default();
        let idle = RoomPhase::Voting {
            countdown_start: None,
        };
        assert_eq!(idle.countdown_remaining(5, &config), None);
        assert_eq!(RoomPhase::Revealed.countdown_remaining(5, &config), None);
        assert!(!RoomPhase::Revealed.countdown_elapsed(5, &config));
    }

    #[test]
    fn test_display() {
        assert_eq!(RoomPhase::Revealed.to_string(), "revealed");
        assert_eq!(PhaseTransition::StartNewVoting.to_string(), "start new voting");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.default_deck, default_deck());
        assert_eq!(config.transitions, TransitionPolicy::Permissive);
        assert!(!config.validate_votes);
        assert_eq!(config.round_countdown, Duration::from_secs(3));
    }
}
