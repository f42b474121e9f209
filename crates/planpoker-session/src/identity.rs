//! Identity hook for establishing who the local participant is.
//!
//! planpoker doesn't implement authentication itself. The hosted backend
//! usually comes with an auth service (anonymous sign-in, OAuth, custom
//! tokens); whatever it is, the session only needs one thing from it: a
//! stable opaque identifier for the current session, available after an
//! asynchronous handshake.
//!
//! That need is the [`IdentityProvider`] trait. Two implementations ship
//! with the crate:
//! - [`AnonymousIdentity`] — a fresh random identifier per sign-in
//! - [`StaticIdentity`] — a fixed identifier, for tests and tools
//!
//! # Why a trait?
//!
//! The room code never cares *how* an identity was obtained, only that
//! one exists. Putting the handshake behind a trait lets a deployment plug
//! in its backend's auth service, while tests sign in as a known id with
//! [`StaticIdentity`] and never touch the network. The provider is passed
//! to [`SessionContext::sign_in`](crate::SessionContext::sign_in) by
//! reference, so the context doesn't have to own it or know its type.

use planpoker_protocol::ParticipantId;
use rand::Rng;

use crate::SessionError;

/// Performs the sign-in handshake and returns the participant identity.
///
/// # Trait bounds
///
/// - `Send + Sync` → a provider can be shared between tasks; the sign-in
///   future may be polled on any Tokio worker thread.
/// - `'static` → it doesn't borrow temporary data, so it can be stored in
///   an `Arc` and kept for the life of the program.
///
/// The returned future is `Send` for the same reason. Implementations
/// just write `async fn sign_in`, as in the example below.
///
/// # Example
///
/// ```rust
/// use planpoker_protocol::ParticipantId;
/// use planpoker_session::{IdentityProvider, SessionError};
///
/// /// Uses the operating system user name as the participant id.
/// struct OsUser;
///
/// impl IdentityProvider for OsUser {
///     async fn sign_in(&self) -> Result<ParticipantId, SessionError> {
///         let user = std::env::var("USER")
///             .map_err(|e| SessionError::SignInFailed(e.to_string()))?;
///         ParticipantId::parse(user)
///             .map_err(|e| SessionError::SignInFailed(e.to_string()))
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Completes the handshake.
    ///
    /// Called once per [`SessionContext::sign_in`](crate::SessionContext::sign_in).
    /// Signing in again calls it again; whether it hands back the same id
    /// is up to the provider.
    ///
    /// # Returns
    /// - `Ok(ParticipantId)` — the identity for this session
    /// - `Err(SessionError::SignInFailed)` — the provider refused or failed
    fn sign_in(
        &self,
    ) -> impl std::future::Future<Output = Result<ParticipantId, SessionError>> + Send;
}

/// Signs in as a new anonymous participant each time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousIdentity;

impl IdentityProvider for AnonymousIdentity {
    async fn sign_in(&self) -> Result<ParticipantId, SessionError> {
        let id = generate_id();
        tracing::debug!(participant = %id, "anonymous sign-in");
        ParticipantId::parse(id).map_err(|e| SessionError::SignInFailed(e.to_string()))
    }
}

/// Always signs in as the same participant.
#[derive(Debug, Clone)]
pub struct StaticIdentity(ParticipantId);

impl StaticIdentity {
    pub fn new(id: ParticipantId) -> Self {
        Self(id)
    }
}

impl IdentityProvider for StaticIdentity {
    async fn sign_in(&self) -> Result<ParticipantId, SessionError> {
        Ok(self.0.clone())
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_sign_in_returns_hex_id() {
        let id = AnonymousIdentity.sign_in().await.unwrap();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_anonymous_sign_in_is_unique_per_call() {
        let a = AnonymousIdentity.sign_in().await.unwrap();
        let b = AnonymousIdentity.sign_in().await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_static_identity_returns_fixed_id() {
        let id = ParticipantId::parse("u1").unwrap();
        let provider = StaticIdentity::new(id.clone());
        assert_eq!(provider.sign_in().await.unwrap(), id);
        assert_eq!(provider.sign_in().await.unwrap(), id);
    }
}
