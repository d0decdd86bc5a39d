//! Reset password action

use anyhow::{bail, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::common::PreparedCredential;
use crate::domains::accounts::models::Account;

/// What the operator asked for.
#[derive(Clone)]
pub struct ResetRequest {
    pub email: String,
    pub credential: PreparedCredential,
    /// Enumerate existing identifiers when the target is missing.
    pub list_on_miss: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Updated {
        email: String,
        plaintext: Option<String>,
    },
    NotFound {
        email: String,
        /// Empty when listing was disabled.
        known_emails: Vec<String>,
    },
}

/// Overwrite the stored credential hash of one account.
///
/// Mutates at most one row. A miss leaves the table untouched and, unless
/// disabled, reports every identifier that does exist.
pub async fn reset_password(request: ResetRequest, pool: &PgPool) -> Result<ResetOutcome> {
    let email = request.email.trim();
    if email.is_empty() {
        bail!("Account email must not be empty");
    }

    let Some(account) = Account::find_by_email(email, pool).await? else {
        warn!(email = %email, "Account not found");

        let known_emails = if request.list_on_miss {
            Account::list_emails(pool).await?
        } else {
            Vec::new()
        };

        return Ok(ResetOutcome::NotFound {
            email: email.to_string(),
            known_emails,
        });
    };

    let updated =
        Account::update_password_hash(&account.email, &request.credential.hash, pool).await?;
    if updated != 1 {
        bail!(
            "Expected to update exactly one account for {}, updated {}",
            account.email,
            updated
        );
    }

    info!(email = %account.email, "Password hash updated");

    Ok(ResetOutcome::Updated {
        email: account.email,
        plaintext: request.credential.plaintext,
    })
}
