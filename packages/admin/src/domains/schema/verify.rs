use sqlx::PgPool;

use super::errors::SchemaError;
use super::expectations::ExpectedColumn;

/// Outcome of checking one expected column against the live catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCheck {
    pub column: ExpectedColumn,
    pub present: bool,
}

/// Whether `column` exists according to `information_schema.columns`.
pub async fn column_exists(column: &ExpectedColumn, pool: &PgPool) -> Result<bool, SchemaError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM information_schema.columns
            WHERE table_schema::text = COALESCE($1::text, current_schema()::text)
              AND table_name::text = $2
              AND column_name::text = $3
        )
        "#,
    )
    .bind(column.schema.as_deref())
    .bind(&column.table)
    .bind(&column.column)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Check every column, one query at a time.
pub async fn verify_columns(
    expected: &[ExpectedColumn],
    pool: &PgPool,
) -> Result<Vec<ColumnCheck>, SchemaError> {
    let mut checks = Vec::with_capacity(expected.len());
    for column in expected {
        let present = column_exists(column, pool).await?;
        checks.push(ColumnCheck {
            column: column.clone(),
            present,
        });
    }
    Ok(checks)
}
