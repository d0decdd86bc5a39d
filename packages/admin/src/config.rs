use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::env;

/// Hosts containing this marker are managed Postgres instances that only
/// accept TLS connections.
pub const MANAGED_HOST_MARKER: &str = "render.com";

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Database connection settings loaded from environment variables
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

// Hand-written so the password never ends up in logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: match lookup("DB_PORT") {
                Some(port) => port.parse().context("DB_PORT must be a valid number")?,
                None => DEFAULT_DB_PORT,
            },
            name: lookup("DB_NAME").context("DB_NAME must be set")?,
            user: lookup("DB_USER").context("DB_USER must be set")?,
            password: lookup("DB_PASSWORD").context("DB_PASSWORD must be set")?,
            max_connections: match lookup("DB_MAX_CONNECTIONS") {
                Some(max) => max
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be a valid number")?,
                None => DEFAULT_MAX_CONNECTIONS,
            },
        })
    }

    /// TLS is required for managed hosts and disabled everywhere else.
    pub fn ssl_mode(&self) -> PgSslMode {
        if self.host.contains(MANAGED_HOST_MARKER) {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode())
    }
}

/// HTTP listener settings for the test endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("PORT must be a valid number")?,
        })
    }
}
