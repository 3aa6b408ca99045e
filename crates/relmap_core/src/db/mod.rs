//! SQLite storage bootstrap, schema migrations and session lifecycle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for both sample domains.
//! - Apply schema migrations in deterministic order.
//! - Own the process-wide session factory (`session`).
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every connection handed out has `foreign_keys=ON`.
//! - Repositories must not touch data before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod session;

pub use open::{open_db, open_db_in_memory, open_db_uri};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Configured database URL cannot be mapped to a SQLite target.
    InvalidDatabaseUrl(String),
    /// Session requested after the factory was shut down.
    FactoryClosed,
    /// Configuration could not be resolved while building the factory.
    Config(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidDatabaseUrl(url) => write!(f, "unsupported database url `{url}`"),
            Self::FactoryClosed => write!(f, "session factory is already shut down"),
            Self::Config(message) => write!(f, "database configuration error: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidDatabaseUrl(_)
            | Self::FactoryClosed
            | Self::Config(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
