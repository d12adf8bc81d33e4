//! Optimistic client for the board API.
//!
//! The client keeps one observed collection per [`CollectionKey`] and routes
//! every write through a [`MutationCoordinator`]: the speculative state is
//! visible at once and is either confirmed with the server's record or
//! undone. It follows the same layout as the server-side contexts:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Store, coordinator and client in [`services`]
//!
//! [`CollectionKey`]: domain::CollectionKey
//! [`MutationCoordinator`]: services::MutationCoordinator

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
