//! Project boards: status lanes and the orderable tasks inside them.
//!
//! Lanes are seeded lazily, positioned with fractional ordering and deleted
//! only after their tasks have moved to a fallback lane. Tasks carry a
//! per-project local identifier rendered as a key such as `ABC-07`.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]
//!
//! Storage adapters shared with tenancy live in [`crate::storage`].

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
