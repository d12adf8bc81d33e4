//! Client-side services: observed store, mutation coordinator and the
//! typed board client.

mod client;
mod coordinator;
mod store;

pub use client::BoardClient;
pub use coordinator::MutationCoordinator;
pub use store::{ObservedStore, Snapshot};
