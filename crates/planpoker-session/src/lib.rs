//! Participant sessions for planpoker.
//!
//! This crate owns the things a room session needs from its environment:
//!
//! 1. **Identity** — who the local participant is ([`IdentityProvider`] trait)
//! 2. **Time** — a [`Clock`] for timestamps and round ids
//! 3. **Context** — the [`SessionContext`] bundling the store handle,
//!    clock and identity, with an explicit sign-in / shutdown lifecycle
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)     ← reads identity and time from the context
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol + store (below)  ← ParticipantId, Store
//! ```
//!
//! # Lifecycle
//!
//! A [`SessionContext`] starts signed out, becomes signed in after
//! [`SessionContext::sign_in`] and ends with [`SessionContext::shutdown`].
//! After shutdown the context reports no participant, so every
//! identity-bound room operation fails with `Unauthenticated` until the
//! next sign-in.
//!
//! Time comes from the context too. Tests install a [`ManualClock`] with
//! [`SessionContext::with_clock`] and advance it by hand instead of
//! sleeping, which keeps countdown and round-id tests deterministic.

mod clock;
mod context;
mod error;
mod identity;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{IdentityState, SessionConfig, SessionContext};
pub use error::SessionError;
pub use identity::{AnonymousIdentity, IdentityProvider, StaticIdentity};
