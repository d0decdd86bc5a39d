//! Integration tests for the credential resetter.

mod common;

use admin_core::common::{hash_password, verify_password, NewCredential, PreparedCredential};
use admin_core::domains::accounts::{reset_password, Account, ResetOutcome, ResetRequest};
use admin_core::kernel::with_pool;
use common::{count_accounts, create_account, fetch_account, old_timestamp, TestHarness};
use test_context::test_context;

fn request(email: &str, password: &str, list_on_miss: bool) -> ResetRequest {
    ResetRequest {
        email: email.to_string(),
        credential: NewCredential::Plaintext(password.to_string())
            .prepare()
            .expect("hashing failed"),
        list_on_miss,
    }
}

// ============================================================================
// Existing account
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn reset_updates_only_the_target_account(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let other_hash = hash_password("other-password").unwrap();
    create_account(pool, "admin@example.com", "old-hash").await.unwrap();
    create_account(pool, "user@example.com", &other_hash).await.unwrap();

    let outcome = reset_password(request("admin@example.com", "N3w-Secret!", true), pool)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ResetOutcome::Updated {
            email: "admin@example.com".to_string(),
            plaintext: Some("N3w-Secret!".to_string()),
        }
    );

    let admin = fetch_account(pool, "admin@example.com").await;
    assert!(verify_password("N3w-Secret!", &admin.password_hash));
    assert!(admin.updated_at > old_timestamp(), "updated_at should be refreshed");

    let untouched = fetch_account(pool, "user@example.com").await;
    assert_eq!(untouched.password_hash, other_hash);
    assert_eq!(untouched.updated_at, old_timestamp());

    assert_eq!(count_accounts(pool).await, 2, "no rows created or deleted");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reset_with_precomputed_hash_stores_it_verbatim(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    create_account(pool, "ops@example.com", "old-hash").await.unwrap();

    let precomputed = hash_password("from-the-vault").unwrap();
    let credential = NewCredential::Hash(precomputed.clone()).prepare().unwrap();

    let outcome = reset_password(
        ResetRequest {
            email: "ops@example.com".to_string(),
            credential,
            list_on_miss: true,
        },
        pool,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        ResetOutcome::Updated {
            email: "ops@example.com".to_string(),
            plaintext: None,
        }
    );
    assert_eq!(fetch_account(pool, "ops@example.com").await.password_hash, precomputed);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reset_trims_surrounding_whitespace_from_email(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    create_account(pool, "admin@example.com", "old-hash").await.unwrap();

    let outcome = reset_password(request("  admin@example.com \n", "pw", true), pool)
        .await
        .unwrap();

    assert!(matches!(outcome, ResetOutcome::Updated { .. }));
}

// ============================================================================
// Unknown account
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_email_lists_accounts_and_mutates_nothing(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    create_account(pool, "zed@example.com", "hash-z").await.unwrap();
    create_account(pool, "amy@example.com", "hash-a").await.unwrap();

    let outcome = reset_password(request("ghost@example.com", "pw", true), pool)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ResetOutcome::NotFound {
            email: "ghost@example.com".to_string(),
            known_emails: vec!["amy@example.com".to_string(), "zed@example.com".to_string()],
        }
    );

    assert_eq!(fetch_account(pool, "amy@example.com").await.password_hash, "hash-a");
    assert_eq!(fetch_account(pool, "zed@example.com").await.password_hash, "hash-z");
    assert_eq!(count_accounts(pool).await, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_email_without_listing_reveals_nothing(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    create_account(pool, "amy@example.com", "hash-a").await.unwrap();

    let outcome = reset_password(request("ghost@example.com", "pw", false), pool)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ResetOutcome::NotFound {
            email: "ghost@example.com".to_string(),
            known_emails: vec![],
        }
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn email_lookup_is_exact(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    create_account(pool, "Admin@Example.com", "hash").await.unwrap();

    let outcome = reset_password(request("admin@example.com", "pw", true), pool)
        .await
        .unwrap();

    assert!(matches!(outcome, ResetOutcome::NotFound { .. }));
    assert_eq!(fetch_account(pool, "Admin@Example.com").await.password_hash, "hash");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_email_is_rejected(ctx: &TestHarness) {
    let result = reset_password(request("   ", "pw", true), &ctx.db_pool).await;
    assert!(result.is_err());
}

// ============================================================================
// Pool lifecycle and errors
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn pool_is_closed_after_successful_reset(ctx: &TestHarness) {
    create_account(&ctx.db_pool, "admin@example.com", "old-hash").await.unwrap();

    let pool = ctx.fresh_pool().await.unwrap();
    let handle = pool.clone();
    let req = request("admin@example.com", "pw", true);

    let outcome = with_pool(pool, |pool| async move { reset_password(req, &pool).await })
        .await
        .unwrap();

    assert!(matches!(outcome, ResetOutcome::Updated { .. }));
    assert!(handle.is_closed());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn database_error_aborts_and_still_closes_pool(ctx: &TestHarness) {
    sqlx::query("DROP TABLE users")
        .execute(&ctx.db_pool)
        .await
        .unwrap();

    let pool = ctx.fresh_pool().await.unwrap();
    let handle = pool.clone();
    let req = ResetRequest {
        email: "admin@example.com".to_string(),
        credential: PreparedCredential {
            hash: "irrelevant".to_string(),
            plaintext: None,
        },
        list_on_miss: true,
    };

    let result = with_pool(pool, |pool| async move { reset_password(req, &pool).await }).await;

    assert!(result.is_err());
    assert!(handle.is_closed());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn list_emails_is_sorted(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    for email in ["c@example.com", "a@example.com", "b@example.com"] {
        create_account(pool, email, "hash").await.unwrap();
    }

    let emails = Account::list_emails(pool).await.unwrap();
    assert_eq!(emails, vec!["a@example.com", "b@example.com", "c@example.com"]);
}
