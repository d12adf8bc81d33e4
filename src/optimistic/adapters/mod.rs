//! Client-side adapters.

pub mod http;

pub use http::{Credentials, HttpRemoteBoard};
