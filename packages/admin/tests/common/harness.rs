//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in a binary. Each test gets
//! its own freshly created and migrated database inside that container, so
//! tests that list or mutate every account cannot see each other's rows.

use std::sync::atomic::{AtomicUsize, Ordering};

use admin_core::kernel::connect;
use admin_core::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::{Mutex, OnceCell};

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    host: String,
    port: u16,
    // Keep container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

/// Postgres rejects concurrent CREATE DATABASE from the same template.
static CREATE_DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?.to_string();
        let port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            host,
            port,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }

    fn config_for(&self, database: &str) -> DatabaseConfig {
        DatabaseConfig {
            host: self.host.clone(),
            port: self.port,
            name: database.to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            max_connections: 5,
        }
    }
}

/// Per-test database plus a pool connected to it.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let pool = &ctx.db_pool;
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for fixtures and assertions.
    pub db_pool: PgPool,
    /// Settings that reach the same database, for code that builds its own pool.
    pub db_config: DatabaseConfig,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    /// Creates a fresh, migrated database in the shared container.
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let name = format!(
            "admin_test_{}_{}",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::SeqCst)
        );

        {
            let _guard = CREATE_DATABASE_LOCK.lock().await;
            let maintenance = connect(&infra.config_for("postgres")).await?;
            sqlx::raw_sql(&format!("CREATE DATABASE {}", name))
                .execute(&maintenance)
                .await
                .context("Failed to create test database")?;
            maintenance.close().await;
        }

        let db_config = infra.config_for(&name);
        let db_pool = connect(&db_config).await?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { db_pool, db_config })
    }

    /// A second pool on the same database, for code under test that closes
    /// the pool it is given.
    pub async fn fresh_pool(&self) -> Result<PgPool> {
        connect(&self.db_config).await
    }
}
