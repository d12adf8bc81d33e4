//! Keyed observed collections.

use crate::optimistic::domain::{CollectionKey, ObservedItem};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// One published state of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Items in display order.
    pub items: Vec<T>,
    /// Incremented by every write to the collection.
    pub revision: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }
}

type Channels<T> = HashMap<CollectionKey, watch::Sender<Snapshot<T>>>;

/// Shared store of observed collections, one per [`CollectionKey`].
///
/// Consumers subscribe and read; only the mutation coordinator writes.
pub struct ObservedStore<T: ObservedItem> {
    channels: Arc<Mutex<Channels<T>>>,
}

impl<T: ObservedItem> Clone for ObservedStore<T> {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl<T: ObservedItem> Default for ObservedStore<T> {
    fn default() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: ObservedItem> ObservedStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a collection. The receiver sees every later write.
    #[must_use]
    pub fn subscribe(&self, key: CollectionKey) -> watch::Receiver<Snapshot<T>> {
        self.lock().entry(key).or_insert_with(channel).subscribe()
    }

    /// Returns the current state of a collection.
    #[must_use]
    pub fn snapshot(&self, key: CollectionKey) -> Snapshot<T> {
        self.lock()
            .get(&key)
            .map(|sender| sender.borrow().clone())
            .unwrap_or_default()
    }

    /// Returns the current items of a collection.
    #[must_use]
    pub fn items(&self, key: CollectionKey) -> Vec<T> {
        self.snapshot(key).items
    }

    /// Returns the item with `id`, if present.
    #[must_use]
    pub fn find(&self, key: CollectionKey, id: &T::Id) -> Option<T> {
        self.lock().get(&key).and_then(|sender| {
            sender
                .borrow()
                .items
                .iter()
                .find(|item| &item.item_id() == id)
                .cloned()
        })
    }

    /// Applies `change` to a collection and publishes the result.
    ///
    /// Returns the closure's result together with the new revision.
    pub(crate) fn modify<R>(
        &self,
        key: CollectionKey,
        change: impl FnOnce(&mut Vec<T>) -> R,
    ) -> (R, u64) {
        let mut channels = self.lock();
        let sender = channels.entry(key).or_insert_with(channel);
        let mut next = sender.borrow().clone();
        let result = change(&mut next.items);
        next.revision = next.revision.wrapping_add(1);
        let revision = next.revision;
        sender.send_replace(next);
        (result, revision)
    }

    /// Replaces a collection unless it was written after `expected`.
    pub(crate) fn replace_if_unchanged(
        &self,
        key: CollectionKey,
        expected: u64,
        items: Vec<T>,
    ) -> bool {
        let mut channels = self.lock();
        let sender = channels.entry(key).or_insert_with(channel);
        let current = sender.borrow().revision;
        if current != expected {
            return false;
        }
        sender.send_replace(Snapshot {
            items,
            revision: current.wrapping_add(1),
        });
        true
    }

    fn lock(&self) -> MutexGuard<'_, Channels<T>> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn channel<T>() -> watch::Sender<Snapshot<T>> {
    watch::channel(Snapshot::default()).0
}
