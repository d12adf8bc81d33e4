//! Route handlers, one module per resource.

pub mod health;
pub mod lanes;
pub mod projects;
pub mod tasks;
pub mod teams;
