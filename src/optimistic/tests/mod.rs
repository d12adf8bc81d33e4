//! Unit tests for the optimistic client.

mod store_tests;
mod support;
