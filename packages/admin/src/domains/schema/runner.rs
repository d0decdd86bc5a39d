//! Load, apply and verify one migration script.

use std::path::PathBuf;

use sqlx::PgPool;
use tracing::{info, warn};

use super::errors::SchemaError;
use super::expectations::ExpectedColumn;
use super::script::{ApplyMode, MigrationScript};
use super::verify::verify_columns;

/// Script location used when the operator does not pass one.
pub const DEFAULT_SCRIPT_PATH: &str = "database/migration.sql";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub path: PathBuf,
    /// Checked in addition to the columns derived from the script.
    pub extra_expectations: Vec<ExpectedColumn>,
    pub mode: ApplyMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SCRIPT_PATH),
            extra_expectations: Vec::new(),
            mode: ApplyMode::default(),
        }
    }
}

/// Verified result of a successful run
#[derive(Debug, Clone)]
pub struct SchemaReport {
    pub path: PathBuf,
    pub rows_affected: u64,
    /// Columns confirmed present after the script ran.
    pub verified: Vec<ExpectedColumn>,
}

/// Load the script, run it, then confirm every expected column exists.
///
/// Never reports success for a script that failed or whose columns are
/// missing afterwards.
pub async fn run_migration(
    options: RunOptions,
    pool: &PgPool,
) -> Result<SchemaReport, SchemaError> {
    let script = MigrationScript::load(&options.path).await?;

    let mut expected = script.expected_columns();
    for column in options.extra_expectations {
        if !expected.contains(&column) {
            expected.push(column);
        }
    }

    let rows_affected = script.apply(options.mode, pool).await?;
    info!(rows_affected, "Migration script executed");

    if expected.is_empty() {
        warn!("Script declares no column additions; nothing to verify");
    }

    let checks = verify_columns(&expected, pool).await?;
    let (present, missing): (Vec<_>, Vec<_>) = checks.into_iter().partition(|c| c.present);

    if !missing.is_empty() {
        return Err(SchemaError::Verification {
            missing: missing.into_iter().map(|c| c.column).collect(),
        });
    }

    Ok(SchemaReport {
        path: script.path().to_path_buf(),
        rows_affected,
        verified: present.into_iter().map(|c| c.column).collect(),
    })
}
