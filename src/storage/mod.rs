//! Persistence adapters.
//!
//! Each backend is a single store implementing both
//! [`TenancyRepository`](crate::tenancy::ports::TenancyRepository) and
//! [`BoardRepository`](crate::board::ports::BoardRepository), so writes
//! spanning projects, lanes and tasks stay atomic.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{BoardPgPool, PostgresStore};
