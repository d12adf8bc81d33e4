//! Mutation lifecycle types.

use super::ObservedItem;
use crate::optimistic::ports::RemoteError;

/// Lifecycle of the mutations issued against one collection.
///
/// `Idle → Mutating → {Committed | RolledBack}`; a key reports `Mutating`
/// while any of its mutations is awaiting the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPhase {
    /// No mutation has run for the key.
    #[default]
    Idle,
    /// At least one mutation awaits the server.
    Mutating,
    /// The last settled mutation was confirmed.
    Committed,
    /// The last settled mutation was undone.
    RolledBack,
}

/// How a mutation ended. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<R> {
    /// The server accepted the change; carries its authoritative record.
    Committed(R),
    /// The server rejected the change or could not be reached; the
    /// speculative state was undone.
    RolledBack(RemoteError),
}

impl<R> MutationOutcome<R> {
    /// Whether the mutation was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// Returns the committed record, if any.
    #[must_use]
    pub fn committed(self) -> Option<R> {
        match self {
            Self::Committed(record) => Some(record),
            Self::RolledBack(_) => None,
        }
    }

    /// Returns the rollback cause, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&RemoteError> {
        match self {
            Self::Committed(_) => None,
            Self::RolledBack(err) => Some(err),
        }
    }
}

/// How a reconciliation fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome<T> {
    /// The fetched items replaced the collection.
    Applied(Vec<T>),
    /// The collection changed while the fetch was in flight; the result was
    /// discarded.
    Stale,
    /// A newer mutation or fetch for the key aborted this one.
    Cancelled,
    /// The fetch failed; the collection is unchanged.
    Failed(RemoteError),
}

/// Speculative change applied to a collection before the server answers.
#[derive(Debug, Clone, PartialEq)]
pub enum Speculation<T: ObservedItem> {
    /// Appends a placeholder carrying a temporary identifier.
    Append(T),
    /// Replaces the item with the same identifier in place.
    Replace(T),
    /// Moves the item just before `before`, or to the end when `before` is
    /// absent or not in the collection.
    Relocate {
        /// The item in its new state.
        item: T,
        /// Item to land in front of.
        before: Option<T::Id>,
        /// Siblings whose positions were renumbered to make room, replaced
        /// in place.
        renumbered: Vec<T>,
    },
}
