//! Subscription handles.

use std::fmt;

use serde_json::Value;

use crate::StorePath;

/// Callback invoked with the value at a subscribed path, or `None` when
/// nothing is stored there.
///
/// Listeners run while the backend applies the write that triggered them,
/// so they must not call back into the store.
pub type Listener = Box<dyn Fn(Option<Value>) + Send + Sync + 'static>;

/// Callback run once after all listeners affected by one write have been
/// called. See [`Store::on_batch_end`](crate::Store::on_batch_end).
pub type BatchHook = Box<dyn Fn() + Send + Sync + 'static>;

type Detach = Box<dyn FnOnce() + Send + Sync + 'static>;

/// An active subscription to one path, or a registered batch hook.
///
/// Owned by whoever called [`Store::subscribe`](crate::Store::subscribe).
/// Call [`close`](Self::close) to stop notifications. Dropping a handle
/// that is still open detaches the listener too, but logs a warning: an
/// unclosed handle means some owner forgot to tear down before replacing
/// its listeners.
#[must_use = "a subscription stays registered until it is closed"]
pub struct Subscription {
    path: StorePath,
    detach: Option<Detach>,
}

impl Subscription {
    /// Creates a handle that runs `detach` exactly once when closed.
    pub fn new(
        path: StorePath,
        detach: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            path,
            detach: Some(Box::new(detach)),
        }
    }

    /// Unregisters the listener. No notification is delivered after this
    /// returns.
    pub fn close(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
            tracing::debug!(path = %self.path, "subscription closed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            tracing::warn!(
                path = %self.path,
                "subscription dropped without close"
            );
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("open", &self.detach.is_some())
            .finish()
    }
}
