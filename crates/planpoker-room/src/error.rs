//! Error types for the room layer.

use planpoker_protocol::{ProtocolError, RoomId};
use planpoker_store::StoreError;

use crate::{PhaseTransition, RoomPhase};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room name has no characters usable in a slug.
    #[error("room name has no usable characters")]
    InvalidName,

    /// A room with the same slug already exists.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// No participant identity has been established yet.
    #[error("not signed in")]
    Unauthenticated,

    /// The vote is not one of the room's cards. Only raised when vote
    /// validation is enabled.
    #[error("vote {0:?} is not in the room's deck")]
    InvalidVote(String),

    /// The transition is not allowed from the current phase. Only raised
    /// under the strict transition policy.
    #[error("cannot {transition} while {phase}")]
    InvalidTransition {
        phase: RoomPhase,
        transition: PhaseTransition,
    },

    /// The backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A record could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
