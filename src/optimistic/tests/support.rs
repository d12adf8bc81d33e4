//! Shared fixtures for optimistic client tests.

use crate::error::ErrorKind;
use crate::optimistic::{domain::ObservedItem, ports::RemoteError};

/// Minimal observed record.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Card {
    pub(super) id: u32,
    pub(super) label: &'static str,
}

impl ObservedItem for Card {
    type Id = u32;

    fn item_id(&self) -> u32 {
        self.id
    }
}

pub(super) const fn card(id: u32, label: &'static str) -> Card {
    Card { id, label }
}

pub(super) fn labels(items: &[Card]) -> Vec<&'static str> {
    items.iter().map(|item| item.label).collect()
}

pub(super) fn rejected() -> RemoteError {
    RemoteError::new(ErrorKind::Conflict, "rejected by server")
}
