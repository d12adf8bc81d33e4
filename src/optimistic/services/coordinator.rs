//! Optimistic mutation protocol.
//!
//! A mutation applies its speculative change to the shared collection at
//! once, then awaits the server. On success the server's record replaces the
//! speculative one in place; on failure the change is undone. Writers to a
//! key are serialized by cancellation: every new mutation aborts the key's
//! in-flight reconciliation fetch, and a fetch that finishes after the
//! collection moved on is discarded.

use super::ObservedStore;
use crate::error::ErrorKind;
use crate::optimistic::{
    domain::{
        CollectionKey, MutationOutcome, MutationPhase, ObservedItem, RefreshOutcome, Speculation,
    },
    ports::{RemoteError, RemoteResult},
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Default)]
struct KeyState {
    pending: usize,
    last: MutationPhase,
    refresh: Option<AbortHandle>,
}

/// What a speculative change did, kept to confirm or undo it.
enum Applied<T: ObservedItem> {
    Inserted {
        placeholder: T::Id,
    },
    Changed {
        id: T::Id,
        current: T,
        previous: Option<(usize, T)>,
        neighbours: Vec<(T, T)>,
    },
    Removed {
        id: T::Id,
        previous: Option<(usize, T)>,
    },
}

impl<T: ObservedItem> Applied<T> {
    fn apply(speculation: Speculation<T>, items: &mut Vec<T>) -> Self {
        match speculation {
            Speculation::Append(item) => {
                let placeholder = item.item_id();
                items.push(item);
                Self::Inserted { placeholder }
            }
            Speculation::Replace(item) => {
                let id = item.item_id();
                let previous = take(items, &id);
                let at = previous.as_ref().map_or(items.len(), |(index, _)| *index);
                items.insert(at, item.clone());
                Self::Changed {
                    id,
                    current: item,
                    previous,
                    neighbours: Vec::new(),
                }
            }
            Speculation::Relocate {
                item,
                before,
                renumbered,
            } => {
                let neighbours = renumbered
                    .into_iter()
                    .filter_map(|sibling| overwrite(items, sibling))
                    .collect();
                let id = item.item_id();
                let previous = take(items, &id);
                let at = before
                    .and_then(|target| position(items, &target))
                    .unwrap_or(items.len());
                items.insert(at, item.clone());
                Self::Changed {
                    id,
                    current: item,
                    previous,
                    neighbours,
                }
            }
        }
    }

    fn removal(id: T::Id, items: &mut Vec<T>) -> Self {
        let previous = take(items, &id);
        Self::Removed { id, previous }
    }

    /// Splices the server's record over the speculative state.
    fn confirm(&self, items: &mut Vec<T>, record: Option<T>) {
        match (self, record) {
            (Self::Inserted { placeholder }, Some(confirmed)) => {
                // A refresh may already have delivered the record itself.
                let confirmed_id = confirmed.item_id();
                if let Some(index) = position(items, &confirmed_id) {
                    items.remove(index);
                }
                let at = take(items, placeholder).map_or(items.len(), |(index, _)| index);
                items.insert(at, confirmed);
            }
            (Self::Changed { id, .. }, Some(confirmed)) => {
                if let Some(slot) = items.iter_mut().find(|item| &item.item_id() == id) {
                    *slot = confirmed;
                }
            }
            (Self::Removed { id, .. }, _) => {
                take(items, id);
            }
            (Self::Inserted { .. } | Self::Changed { .. }, None) => {}
        }
    }

    /// Undoes only this mutation's own change.
    fn compensate(self, items: &mut Vec<T>) {
        match self {
            Self::Inserted { placeholder } => {
                take(items, &placeholder);
            }
            Self::Changed {
                id,
                current,
                previous,
                neighbours,
            } => {
                for (speculative, prior) in neighbours {
                    if let Some(slot) = items.iter_mut().find(|item| **item == speculative) {
                        *slot = prior;
                    }
                }
                // A newer write to the same item owns it now.
                if position(items, &id).is_some_and(|index| items.get(index) != Some(&current)) {
                    return;
                }
                take(items, &id);
                restore(items, previous);
            }
            Self::Removed { id, previous } => {
                if position(items, &id).is_none() {
                    restore(items, previous);
                }
            }
        }
    }
}

fn position<T: ObservedItem>(items: &[T], id: &T::Id) -> Option<usize> {
    items.iter().position(|item| &item.item_id() == id)
}

fn restore<T>(items: &mut Vec<T>, previous: Option<(usize, T)>) {
    if let Some((index, item)) = previous {
        let at = index.min(items.len());
        items.insert(at, item);
    }
}

/// Replaces the item sharing `next`'s identifier, returning the new and the
/// replaced value.
fn overwrite<T: ObservedItem>(items: &mut [T], next: T) -> Option<(T, T)> {
    let id = next.item_id();
    let slot = items.iter_mut().find(|item| item.item_id() == id)?;
    let prior = std::mem::replace(slot, next.clone());
    Some((next, prior))
}

fn take<T: ObservedItem>(items: &mut Vec<T>, id: &T::Id) -> Option<(usize, T)> {
    position(items, id).map(|index| (index, items.remove(index)))
}

/// Coordinates optimistic writes to an [`ObservedStore`].
pub struct MutationCoordinator<T: ObservedItem> {
    store: ObservedStore<T>,
    keys: Arc<Mutex<HashMap<CollectionKey, KeyState>>>,
}

impl<T: ObservedItem> Clone for MutationCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<T: ObservedItem> Default for MutationCoordinator<T> {
    fn default() -> Self {
        Self::new(ObservedStore::new())
    }
}

impl<T: ObservedItem> MutationCoordinator<T> {
    /// Creates a coordinator owning writes to `store`.
    #[must_use]
    pub fn new(store: ObservedStore<T>) -> Self {
        Self {
            store,
            keys: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the store for reading and subscribing.
    #[must_use]
    pub const fn store(&self) -> &ObservedStore<T> {
        &self.store
    }

    /// Returns the mutation phase of a key.
    #[must_use]
    pub fn phase(&self, key: CollectionKey) -> MutationPhase {
        self.lock().get(&key).map_or(MutationPhase::Idle, |state| {
            if state.pending > 0 {
                MutationPhase::Mutating
            } else {
                state.last
            }
        })
    }

    /// Applies `speculation` at once, then settles it with the result of
    /// `commit`.
    pub async fn mutate<Fut>(
        &self,
        key: CollectionKey,
        speculation: Speculation<T>,
        commit: Fut,
    ) -> MutationOutcome<T>
    where
        Fut: Future<Output = RemoteResult<T>>,
    {
        let ticket = self.begin(key, |items| Applied::apply(speculation, items));
        match commit.await {
            Ok(record) => {
                self.commit(key, &ticket.applied, Some(record.clone()));
                MutationOutcome::Committed(record)
            }
            Err(err) => {
                self.roll_back(key, ticket, &err);
                MutationOutcome::RolledBack(err)
            }
        }
    }

    /// Removes the item with `id` at once, then settles the removal with the
    /// result of `commit`.
    pub async fn remove<Fut>(
        &self,
        key: CollectionKey,
        id: T::Id,
        commit: Fut,
    ) -> MutationOutcome<()>
    where
        Fut: Future<Output = RemoteResult<()>>,
    {
        let ticket = self.begin(key, |items| Applied::removal(id, items));
        match commit.await {
            Ok(()) => {
                self.commit(key, &ticket.applied, None);
                MutationOutcome::Committed(())
            }
            Err(err) => {
                self.roll_back(key, ticket, &err);
                MutationOutcome::RolledBack(err)
            }
        }
    }

    /// Rejects a mutation before anything was applied.
    #[must_use]
    pub fn reject<R>(&self, key: CollectionKey, err: RemoteError) -> MutationOutcome<R> {
        tracing::debug!(%key, error = %err, "mutation rejected before dispatch");
        self.lock().entry(key).or_default().last = MutationPhase::RolledBack;
        MutationOutcome::RolledBack(err)
    }

    /// Starts a reconciliation fetch in the background, aborting any older
    /// one for the same key.
    ///
    /// The fetched items replace the collection only if nothing wrote to it
    /// while the fetch was in flight.
    #[must_use]
    pub fn spawn_refresh<Fut>(
        &self,
        key: CollectionKey,
        fetch: Fut,
    ) -> JoinHandle<RefreshOutcome<T>>
    where
        Fut: Future<Output = RemoteResult<Vec<T>>> + Send + 'static,
    {
        let store = self.store.clone();
        let mut keys = self.lock();
        let started = store.snapshot(key).revision;
        let handle = tokio::spawn(async move {
            match fetch.await {
                Ok(items) => {
                    if store.replace_if_unchanged(key, started, items.clone()) {
                        RefreshOutcome::Applied(items)
                    } else {
                        tracing::debug!(%key, "discarding stale refresh");
                        RefreshOutcome::Stale
                    }
                }
                Err(err) => {
                    tracing::warn!(%key, error = %err, "refresh failed");
                    RefreshOutcome::Failed(err)
                }
            }
        });
        let state = keys.entry(key).or_default();
        if let Some(older) = state.refresh.replace(handle.abort_handle()) {
            older.abort();
        }
        handle
    }

    /// Runs a reconciliation fetch and waits for its outcome.
    pub async fn refresh<Fut>(&self, key: CollectionKey, fetch: Fut) -> RefreshOutcome<T>
    where
        Fut: Future<Output = RemoteResult<Vec<T>>> + Send + 'static,
    {
        match self.spawn_refresh(key, fetch).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => RefreshOutcome::Cancelled,
            Err(err) => {
                RefreshOutcome::Failed(RemoteError::new(ErrorKind::Internal, err.to_string()))
            }
        }
    }

    fn begin(
        &self,
        key: CollectionKey,
        speculate: impl FnOnce(&mut Vec<T>) -> Applied<T>,
    ) -> Ticket<T> {
        {
            let mut keys = self.lock();
            let state = keys.entry(key).or_default();
            if let Some(refresh) = state.refresh.take() {
                tracing::debug!(%key, "cancelling in-flight refresh");
                refresh.abort();
            }
            state.pending = state.pending.saturating_add(1);
        }
        let ((before, applied), revision) = self.store.modify(key, |items| {
            let snapshot = items.clone();
            (snapshot, speculate(items))
        });
        Ticket {
            before,
            applied,
            revision,
        }
    }

    fn commit(&self, key: CollectionKey, applied: &Applied<T>, record: Option<T>) {
        self.store.modify(key, |items| applied.confirm(items, record));
        self.settle(key, MutationPhase::Committed);
        tracing::debug!(%key, "mutation committed");
    }

    fn roll_back(&self, key: CollectionKey, ticket: Ticket<T>, err: &RemoteError) {
        let Ticket {
            before,
            applied,
            revision,
        } = ticket;
        if !self.store.replace_if_unchanged(key, revision, before) {
            // A newer write landed meanwhile; keep it and undo only this change.
            self.store.modify(key, |items| applied.compensate(items));
        }
        self.settle(key, MutationPhase::RolledBack);
        tracing::warn!(%key, error = %err, "mutation rolled back");
    }

    fn settle(&self, key: CollectionKey, phase: MutationPhase) {
        let mut keys = self.lock();
        let state = keys.entry(key).or_default();
        state.pending = state.pending.saturating_sub(1);
        state.last = phase;
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CollectionKey, KeyState>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Ticket<T: ObservedItem> {
    before: Vec<T>,
    applied: Applied<T>,
    revision: u64,
}
