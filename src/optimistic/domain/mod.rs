//! Client-side domain: collection keys, observed items and mutation
//! lifecycle.

mod item;
mod key;
mod mutation;

pub use item::ObservedItem;
pub use key::CollectionKey;
pub use mutation::{MutationOutcome, MutationPhase, RefreshOutcome, Speculation};
