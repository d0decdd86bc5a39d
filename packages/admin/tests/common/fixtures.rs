//! Test fixtures for creating and inspecting accounts.

use admin_core::domains::accounts::Account;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Insert an account with a fixed, old `updated_at` so bumps are visible.
pub async fn create_account(pool: &PgPool, email: &str, password_hash: &str) -> Result<Account> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO users (email, password_hash, updated_at)
        VALUES ($1, $2, $3)
        RETURNING email, password_hash, updated_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(old_timestamp())
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Load an account, panicking if it is gone.
pub async fn fetch_account(pool: &PgPool, email: &str) -> Account {
    Account::find_by_email(email, pool)
        .await
        .expect("query failed")
        .unwrap_or_else(|| panic!("account {} missing", email))
}

pub async fn count_accounts(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .expect("count failed")
}

pub fn old_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}
