//! Error types for the session layer.

use std::time::Duration;

/// Errors that can occur while establishing or using a participant
/// identity.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The identity provider rejected the sign-in or failed to answer.
    #[error("sign-in failed: {0}")]
    SignInFailed(String),

    /// The identity provider did not answer within the configured
    /// timeout.
    #[error("sign-in timed out after {0:?}")]
    SignInTimedOut(Duration),

    /// An operation needed an identity before the handshake completed
    /// (or after the session was shut down).
    #[error("no participant identity established")]
    NotSignedIn,
}
