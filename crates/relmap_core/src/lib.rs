//! Relational mapping core: two sample domains (a bookstore chain and a
//! company org chart) persisted in SQLite, with repositories that keep
//! one-to-one, one-to-many and many-to-many links consistent on both sides.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, DatabaseConfig, LoggingConfig};
pub use db::session::{Session, SessionFactory};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{LinkError, WithMany, WithOne};
pub use repo::{ConstraintKind, ConstraintViolation, RepoError, RepoResult};
pub use service::bookstore_service::BookstoreService;
pub use service::company_service::CompanyService;
pub use service::{DeleteSummary, Report, SeedOutcome, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
