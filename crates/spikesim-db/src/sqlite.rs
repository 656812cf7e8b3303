//! SQLite connection pool wrapper and configuration.
//!
//! SQLite is the only persistent store for spikesim. It holds the full
//! spike history for the process lifetime; there is no retention or
//! eviction policy. Uses [`sqlx`] with runtime query construction (not
//! compile-time checked) so no live database is required at build time.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::DbError;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Default connection acquire timeout in seconds.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Configuration for the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// SQLite connection URL.
    ///
    /// Format: `sqlite://path/to/file.db`
    pub url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Timeout when acquiring a connection from the pool.
    pub acquire_timeout: Duration,
}

impl SqliteConfig {
    /// Create a new configuration from a database URL.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection acquire timeout.
    #[must_use]
    pub const fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Connection pool handle to the SQLite database.
///
/// Wraps a [`sqlx::SqlitePool`] and provides access to the spike store
/// operations. Cloning is cheap; all clones share the same pool.
#[derive(Clone)]
pub struct SpikePool {
    pool: SqlitePool,
}

impl SpikePool {
    /// Open the database using the provided configuration.
    ///
    /// The database file is created if it does not exist. WAL journal
    /// mode is enabled so concurrent readers are never blocked for
    /// longer than a single insert.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed, or
    /// [`DbError::Sqlite`] if the pool cannot be opened.
    pub async fn connect(config: &SqliteConfig) -> Result<Self, DbError> {
        let connect_options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::Config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(connect_options)
            .await?;

        tracing::info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Opened SQLite database"
        );

        Ok(Self { pool })
    }

    /// Open using a database URL string with default pool settings.
    ///
    /// Convenience wrapper around [`SpikePool::connect`] with
    /// [`SqliteConfig::new`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened.
    pub async fn connect_url(url: &str) -> Result<Self, DbError> {
        let config = SqliteConfig::new(url);
        Self::connect(&config).await
    }

    /// Open an in-memory database for tests.
    ///
    /// The pool is pinned to a single connection that never expires --
    /// an in-memory SQLite database lives and dies with its connection,
    /// so a second pooled connection would see an empty database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the pool cannot be opened.
    pub async fn connect_in_memory() -> Result<Self, DbError> {
        let connect_options = SqliteConnectOptions::new().in_memory(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await?;

        Ok(Self { pool })
    }

    /// Run all pending migrations from the `migrations/` directory.
    ///
    /// This is the "schema is ensured to exist" step of process
    /// startup; it is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if any migration fails.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Return a reference to the underlying [`SqlitePool`].
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite pool closed");
    }
}
