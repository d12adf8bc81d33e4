//! Step definitions for lane management scenarios.

mod given;
mod then;
mod when;
pub mod world;
