//! `PostgreSQL` integration tests for the board store.
//!
//! Tests are organized into modules by functionality:
//! - `helpers`: Embedded cluster, template database and service wiring
//! - `sequence_tests`: Task numbering under concurrent creates
//! - `lane_tests`: Lane deletion, rekeying and default handover
//!
//! Uses `pg-embed-setup-unpriv` for embedded `PostgreSQL` lifecycle
//! management.

mod postgres {
    pub mod helpers;

    mod lane_tests;
    mod sequence_tests;
}
