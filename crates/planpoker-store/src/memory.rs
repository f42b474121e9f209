//! In-process [`Store`] backend.
//!
//! Holds the whole tree behind one mutex. Every write is applied under the
//! lock, listeners are notified and batch hooks run before it is released,
//! which gives the ordering and atomicity guarantees the [`Store`] contract
//! asks for.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::{Map, Value};

use crate::{BatchHook, Listener, Store, StoreError, StorePath, Subscription, tree};

/// A [`Store`] kept entirely in memory.
///
/// Cheap to clone; clones share the same tree and listeners.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    listeners: BTreeMap<u64, Registration>,
    hooks: BTreeMap<u64, BatchHook>,
    next_id: u64,
    closed: bool,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn run_hooks(&self) {
        for hook in self.hooks.values() {
            hook();
        }
    }
}

struct Registration {
    path: StorePath,
    listener: Listener,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `root`.
    pub fn with_root(root: Value) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            tree::set(&mut inner.root, &StorePath::root(), root);
        }
        store
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|i| i.listeners.len()).unwrap_or(0)
    }

    /// Shuts the store down.
    ///
    /// Listeners and hooks are dropped without further notification and
    /// every later operation fails with [`StoreError::Closed`]. Closing
    /// twice is harmless.
    pub fn close(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            if !inner.closed {
                inner.closed = true;
                inner.listeners.clear();
                inner.hooks.clear();
                tracing::debug!("memory store closed");
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::unavailable_msg("store lock poisoned"))?;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        Ok(inner)
    }
}

/// Applies `writes` as one unit, notifies affected listeners once, then
/// runs the batch hooks if any listener was notified.
fn apply(inner: &mut Inner, writes: Vec<(StorePath, Value)>) {
    let affected: Vec<(u64, Option<Value>)> = inner
        .listeners
        .iter()
        .filter(|(_, reg)| writes.iter().any(|(p, _)| p.overlaps(&reg.path)))
        .map(|(id, reg)| (*id, tree::get(&inner.root, &reg.path).cloned()))
        .collect();

    for (path, value) in writes {
        tracing::debug!(%path, "store write");
        tree::set(&mut inner.root, &path, value);
    }

    let mut notified = false;
    for (id, before) in affected {
        if let Some(reg) = inner.listeners.get(&id) {
            let after = tree::get(&inner.root, &reg.path).cloned();
            if after != before {
                (reg.listener)(after);
                notified = true;
            }
        }
    }
    if notified {
        inner.run_hooks();
    }
}

fn detach_listener(inner: &Weak<Mutex<Inner>>, id: u64) {
    if let Some(inner) = inner.upgrade() {
        if let Ok(mut inner) = inner.lock() {
            inner.listeners.remove(&id);
        }
    }
}

fn detach_hook(inner: &Weak<Mutex<Inner>>, id: u64) {
    if let Some(inner) = inner.upgrade() {
        if let Ok(mut inner) = inner.lock() {
            inner.hooks.remove(&id);
        }
    }
}

impl Store for MemoryStore {
    async fn exists(&self, path: &StorePath) -> Result<bool, StoreError> {
        let inner = self.lock()?;
        Ok(tree::get(&inner.root, path).is_some())
    }

    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let inner = self.lock()?;
        Ok(tree::get(&inner.root, path).cloned())
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        apply(&mut *self.lock()?, vec![(path.clone(), value)]);
        Ok(())
    }

    async fn patch(
        &self,
        path: &StorePath,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let writes = fields
            .into_iter()
            .map(|(key, value)| (path.child(key), value))
            .collect();
        apply(&mut *self.lock()?, writes);
        Ok(())
    }

    async fn multi_patch(
        &self,
        updates: BTreeMap<StorePath, Value>,
    ) -> Result<(), StoreError> {
        let paths: Vec<&StorePath> = updates.keys().collect();
        for (i, a) in paths.iter().enumerate() {
            if let Some(b) = paths[i + 1..].iter().find(|b| a.overlaps(b)) {
                return Err(StoreError::InvalidPath(format!(
                    "overlapping paths in update: {a} and {b}"
                )));
            }
        }
        apply(&mut *self.lock()?, updates.into_iter().collect());
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &StorePath,
        listener: Listener,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.lock()?;
        let id = inner.next_id();

        listener(tree::get(&inner.root, path).cloned());
        inner.run_hooks();
        inner.listeners.insert(
            id,
            Registration {
                path: path.clone(),
                listener,
            },
        );
        tracing::debug!(%path, id, "listener registered");

        let weak = Arc::downgrade(&self.inner);
        Ok(Subscription::new(path.clone(), move || {
            detach_listener(&weak, id)
        }))
    }

    async fn on_batch_end(&self, hook: BatchHook) -> Result<Subscription, StoreError> {
        let mut inner = self.lock()?;
        let id = inner.next_id();
        inner.hooks.insert(id, hook);
        tracing::debug!(id, "batch hook registered");

        let weak = Arc::downgrade(&self.inner);
        Ok(Subscription::new(StorePath::root(), move || {
            detach_hook(&weak, id)
        }))
    }

    async fn write_if_absent(
        &self,
        path: &StorePath,
        value: Value,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        if tree::get(&inner.root, path).is_some() {
            return Ok(false);
        }
        apply(&mut inner, vec![(path.clone(), value)]);
        Ok(true)
    }
}
