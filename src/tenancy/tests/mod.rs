//! Unit tests for the tenancy bounded context.
