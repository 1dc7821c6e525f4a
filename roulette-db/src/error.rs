//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Row could not be turned into a domain value
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Check if this error is a primary key or unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Sqlx(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<Error> for roulette_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(what) => roulette_core::Error::NotFound(what),
            other => roulette_core::Error::Storage(other.to_string()),
        }
    }
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;
