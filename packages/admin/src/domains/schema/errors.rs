use std::path::PathBuf;

use thiserror::Error;

use super::expectations::ExpectedColumn;

/// Failures of a single migration run
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read migration script {}: {source}", .path.display())]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration script {} is empty", .path.display())]
    EmptyScript { path: PathBuf },

    #[error("Migration script failed: {0}")]
    Execute(#[source] sqlx::Error),

    #[error("Migration ran but expected columns are missing: {}", list_columns(.missing))]
    Verification { missing: Vec<ExpectedColumn> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn list_columns(columns: &[ExpectedColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
