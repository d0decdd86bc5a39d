// Backend Admin Tools - Core
//
// Operational utilities for the web backend: a credential resetter, a schema
// migration runner, and a minimal HTTP test endpoint. Each ships as its own
// binary and shares only configuration and pool setup from this crate.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
