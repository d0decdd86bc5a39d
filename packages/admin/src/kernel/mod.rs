//! Kernel module - process infrastructure shared by the admin binaries.

pub mod db;
pub mod telemetry;

pub use db::{connect, with_pool};
pub use telemetry::init_tracing;
