//! Port contracts for tenancy.
//!
//! Ports define infrastructure-agnostic interfaces used by tenancy services.

pub mod identity;
pub mod repository;

pub use identity::IdentityProvider;
pub use repository::{TenancyRepository, TenancyRepositoryError, TenancyRepositoryResult};
