//! Repository layer: one data-access contract per entity type.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary.
//! - Run every operation through the join-or-create rule of [`tx`].
//! - Translate SQLite constraint failures into [`ConstraintViolation`].
//!
//! # Invariants
//! - Lookups that match nothing return `None`, deletes of absent rows succeed.
//! - `save`/`update` persist scalar and foreign-key columns only; join rows
//!   change through the explicit relationship operations.

use crate::db::DbError;
use crate::model::LinkError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod table;
pub mod tx;

pub mod address_repo;
pub mod author_repo;
pub mod book_repo;
pub mod bookstore_repo;
pub mod department_repo;
pub mod employee_repo;
pub mod project_repo;
pub mod publisher_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Which declared constraint a write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    PrimaryKey,
    Check,
    Other,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Self {
        use rusqlite::ffi;

        if code == ffi::SQLITE_CONSTRAINT_UNIQUE {
            Self::Unique
        } else if code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            Self::ForeignKey
        } else if code == ffi::SQLITE_CONSTRAINT_NOTNULL {
            Self::NotNull
        } else if code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY {
            Self::PrimaryKey
        } else if code == ffi::SQLITE_CONSTRAINT_CHECK {
            Self::Check
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign_key",
            Self::NotNull => "not_null",
            Self::PrimaryKey => "primary_key",
            Self::Check => "check",
            Self::Other => "other",
        }
    }
}

#[derive(Debug)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub message: String,
    source: rusqlite::Error,
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} constraint violated: {}",
            self.kind.as_str(),
            self.message
        )
    }
}

impl Error for ConstraintViolation {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug)]
pub enum RepoError {
    Constraint(ConstraintViolation),
    /// `update` or a relationship operation referenced a missing row.
    NotFound { entity: &'static str, id: i64 },
    /// Operation needs an identity the entity does not have yet.
    Unsaved { entity: &'static str },
    InvalidData(String),
    Db(DbError),
}

impl RepoError {
    /// Constraint kind when this error is a constraint violation.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::Constraint(violation) => Some(violation.kind),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constraint(violation) => write!(f, "{violation}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Unsaved { entity } => write!(f, "{entity} has not been saved yet"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Constraint(violation) => Some(violation),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::Unsaved { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation {
                return Self::Constraint(ConstraintViolation {
                    kind: ConstraintKind::from_extended_code(failure.extended_code),
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                    source: value,
                });
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<LinkError> for RepoError {
    fn from(value: LinkError) -> Self {
        Self::Unsaved {
            entity: value.entity,
        }
    }
}
