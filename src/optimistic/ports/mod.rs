//! Client-side port contracts.

pub mod remote;

#[cfg(test)]
pub use remote::MockRemoteBoard;
pub use remote::{RemoteBoard, RemoteError, RemoteResult};
