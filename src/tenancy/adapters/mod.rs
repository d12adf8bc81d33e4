//! Adapter implementations for tenancy ports.
//!
//! Persistence adapters live in [`crate::storage`] because they back both the
//! tenancy and board ports from one store.

mod identity;

pub use identity::StaticIdentityProvider;
