//! Store abstraction layer for planpoker.
//!
//! Provides the [`Store`] trait: the small set of primitives a hosted
//! real-time database offers (read, overwrite, merge, atomic multi-path
//! update, and path subscriptions). Everything above this crate talks to
//! the backend only through it.
//!
//! Values are JSON trees (`serde_json::Value`). Following the backend's
//! model, a `null` written anywhere deletes that location, and objects left
//! empty disappear. So writing `{"vote": null}` into a player record
//! removes the vote, and removing the last player removes `players` too.
//!
//! # Why a trait?
//!
//! Planning poker only needs "somewhere shared to put a few JSON records
//! and hear about changes". In production that is a hosted real-time
//! database; in tests and demos it is [`MemoryStore`]. Putting the backend
//! behind a trait means the room logic is written once and exercised
//! against the in-memory store, and a new backend is one `impl Store`
//! away.
//!
//! # Notifications
//!
//! A listener registered with [`Store::subscribe`] is called with the
//! current value right away, then once per write that changes its path.
//! A write touching several subscribed paths (a
//! [`multi_patch`](Store::multi_patch)) calls each of their listeners
//! once, and afterwards runs every hook registered with
//! [`Store::on_batch_end`]. A consumer that keeps state across several
//! paths stages the listener values and publishes in its hook, so nobody
//! sees half of an update.
//!
//! ```text
//! write ──→ apply to tree ──→ listener(meta) ──→ listener(players) ──→ batch hooks
//!                              (stage)             (stage)              (publish)
//! ```
//!
//! # Feature Flags
//!
//! - `memory` (default) — [`MemoryStore`], an in-process backend

mod error;
#[cfg(feature = "memory")]
mod memory;
mod path;
mod subscription;
mod tree;

pub use error::StoreError;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use path::{StorePath, is_valid_key};
pub use subscription::{BatchHook, Listener, Subscription};

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::{Map, Value};

/// Primitives of a hierarchical real-time key-value backend.
///
/// Implementations must deliver notifications for one path in the order
/// writes were applied, and must apply [`multi_patch`](Self::multi_patch)
/// atomically: a subscriber sees either none or all of its paths updated.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by every session in a process,
///   and Tokio may poll their futures on different worker threads.
/// - `'static` → the store is held in an `Arc` for as long as any session
///   uses it, so it cannot borrow temporary data.
///
/// Every method returns a `Send` future so sessions can be driven from
/// spawned tasks.
pub trait Store: Send + Sync + 'static {
    /// Returns `true` if a value is stored at `path`.
    fn exists(
        &self,
        path: &StorePath,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Reads the value at `path`.
    fn read(
        &self,
        path: &StorePath,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Replaces whatever is stored at `path`. Writing `null` deletes it.
    fn write(
        &self,
        path: &StorePath,
        value: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Merges `fields` into the object at `path`. Fields not named are
    /// left untouched; a `null` field is deleted.
    fn patch(
        &self,
        path: &StorePath,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Writes every entry as one atomic update.
    ///
    /// # Errors
    /// [`StoreError::InvalidPath`] if one path is an ancestor of another.
    fn multi_patch(
        &self,
        updates: BTreeMap<StorePath, Value>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Registers `listener` on `path`.
    ///
    /// The listener is called once with the current value before this
    /// returns, then after every write that changes the value at `path`.
    fn subscribe(
        &self,
        path: &StorePath,
        listener: Listener,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;

    /// Registers `hook` to run after the listeners of each write.
    ///
    /// The hook runs once per write (or initial
    /// [`subscribe`](Self::subscribe) delivery) that called at least one
    /// listener, after all of them have returned. Closing the returned
    /// handle unregisters the hook.
    fn on_batch_end(
        &self,
        hook: BatchHook,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;

    /// Deletes the value at `path`.
    fn remove(
        &self,
        path: &StorePath,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.write(path, Value::Null).await }
    }

    /// Writes `value` only if nothing is stored at `path`. Returns whether
    /// the write happened.
    ///
    /// The default is a plain check followed by a write, which races with
    /// other writers. Backends with a conditional write override it.
    fn write_if_absent(
        &self,
        path: &StorePath,
        value: Value,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        async move {
            if self.exists(path).await? {
                return Ok(false);
            }
            self.write(path, value).await?;
            Ok(true)
        }
    }
}
