//! Database layer for reviewer roulette
//!
//! Provides SQLite persistence for teams, users, pull requests and their
//! reviewer assignments, and implements the `roulette-core` storage traits on
//! top of it.

pub mod error;
pub mod repos;
pub mod store;

use std::path::Path;

use roulette_core::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

pub use error::{Error, Result};
pub use repos::{PullRequestRepository, StatsRepository, TeamRepository, UserRepository};
pub use store::{SqliteStore, SqliteUnitOfWork};

/// Database connection pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration
    ///
    /// Creates the file and its parent directory if needed and runs pending
    /// migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // WAL lets roster reads proceed while a pull request write is open
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!(path = %config.path.display(), "Database ready");
        Ok(Self { pool })
    }

    /// Open a database file with default settings
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = DatabaseConfig {
            path: path.as_ref().to_path_buf(),
            ..DatabaseConfig::default()
        };
        Self::connect(&config).await
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the users repository
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get the teams repository
    pub fn teams(&self) -> TeamRepository {
        TeamRepository::new(self.pool.clone())
    }

    /// Get the pull requests repository
    pub fn pull_requests(&self) -> PullRequestRepository {
        PullRequestRepository::new(self.pool.clone())
    }

    /// Get the reporting repository
    pub fn stats(&self) -> StatsRepository {
        StatsRepository::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
