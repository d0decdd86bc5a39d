//! Schema domain - one-shot SQL migration scripts
//!
//! Responsibilities:
//! - Reading a migration script from disk and executing it as a single batch
//! - Confirming the columns the script adds actually exist afterwards

pub mod errors;
pub mod expectations;
pub mod runner;
pub mod script;
pub mod verify;

pub use errors::SchemaError;
pub use expectations::{expected_columns, ExpectedColumn};
pub use runner::{run_migration, RunOptions, SchemaReport, DEFAULT_SCRIPT_PATH};
pub use script::{ApplyMode, MigrationScript};
pub use verify::{column_exists, verify_columns, ColumnCheck};
