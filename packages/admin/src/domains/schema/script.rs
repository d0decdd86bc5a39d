use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tracing::{debug, info};

use super::errors::SchemaError;
use super::expectations::{expected_columns, ExpectedColumn};

/// How the script text is sent to the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyMode {
    /// One multi-statement batch; atomicity is whatever Postgres gives a
    /// simple query.
    #[default]
    Batch,
    /// Same batch inside an explicit BEGIN/COMMIT.
    Transaction,
}

/// A SQL script read fully into memory. Nothing records whether it has
/// already been applied; idempotence is up to the SQL itself.
#[derive(Debug, Clone)]
pub struct MigrationScript {
    path: PathBuf,
    sql: String,
}

impl MigrationScript {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref().to_path_buf();

        let sql = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SchemaError::ReadScript {
                path: path.clone(),
                source,
            })?;

        if sql.trim().is_empty() {
            return Err(SchemaError::EmptyScript { path });
        }

        debug!(path = %path.display(), bytes = sql.len(), "Loaded migration script");
        Ok(Self { path, sql })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Columns the script's `ALTER TABLE ... ADD` clauses promise.
    pub fn expected_columns(&self) -> Vec<ExpectedColumn> {
        expected_columns(&self.sql)
    }

    /// Execute the whole script. Returns the total rows affected.
    pub async fn apply(&self, mode: ApplyMode, pool: &PgPool) -> Result<u64, SchemaError> {
        info!(path = %self.path.display(), ?mode, "Applying migration script");

        let result = match mode {
            ApplyMode::Batch => sqlx::raw_sql(&self.sql)
                .execute(pool)
                .await
                .map_err(SchemaError::Execute)?,
            ApplyMode::Transaction => {
                let mut tx = pool.begin().await?;
                let result = sqlx::raw_sql(&self.sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(SchemaError::Execute)?;
                tx.commit().await?;
                result
            }
        };

        Ok(result.rows_affected())
    }
}
