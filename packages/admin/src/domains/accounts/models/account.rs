use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Account - a backend user keyed by a unique email identifier
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Account {
    pub email: String,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Account {
    /// Find account by email
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT email, password_hash, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// List every known email, alphabetically
    pub async fn list_emails(pool: &PgPool) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT email FROM users ORDER BY email")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Overwrite the credential hash and bump `updated_at`.
    ///
    /// Returns the number of rows touched (0 or 1, `email` is unique).
    pub async fn update_password_hash(
        email: &str,
        password_hash: &str,
        pool: &PgPool,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE email = $2",
        )
        .bind(password_hash)
        .bind(email)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
