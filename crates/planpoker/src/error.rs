//! Unified error type for planpoker.

use planpoker_protocol::ProtocolError;
use planpoker_room::RoomError;
use planpoker_session::SessionError;
use planpoker_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `planpoker` facade you deal with this single error type
/// instead of importing errors from each sub-crate; `?` converts them.
#[derive(Debug, thiserror::Error)]
pub enum PlanPokerError {
    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A record could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Sign-in failed or timed out.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room operation was rejected.
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl PlanPokerError {
    /// Returns `true` for errors caused by the backend rather than by the
    /// request.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Room(RoomError::Store(_))
        )
    }
}
