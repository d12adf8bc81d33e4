//! Taskboard: a multi-tenant task board.
//!
//! Principals belong to teams, teams own projects, projects contain status
//! lanes and lanes contain orderable tasks. Every operation re-derives the
//! caller's access scope; tasks and lanes are positioned with fractional
//! indices; clients apply writes optimistically and roll them back when the
//! server refuses.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, etc.)
//! - **Services**: Orchestration of domain types over ports
//!
//! # Modules
//!
//! - [`tenancy`]: Teams, memberships, projects and access scope resolution
//! - [`board`]: Lanes, tasks, ordering and task numbering
//! - [`storage`]: In-memory and `PostgreSQL` repositories
//! - [`api`]: REST surface
//! - [`optimistic`]: Optimistic client for the REST surface
//! - [`config`], [`telemetry`]: Server configuration and logging

pub mod api;
pub mod board;
pub mod config;
pub mod error;
mod ids;
pub mod optimistic;
pub mod storage;
pub mod telemetry;
pub mod tenancy;
