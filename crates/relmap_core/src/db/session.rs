//! Session factory and its process-wide lifecycle.
//!
//! # Responsibility
//! - Resolve the configured database target once and bootstrap its schema.
//! - Hand out short-lived sessions (one SQLite connection each).
//! - Provide the `initialize` / `get_factory` / `shutdown` lifecycle pair.
//!
//! # Invariants
//! - At most one process-wide factory is ever constructed; first-time
//!   construction is serialized by the `OnceCell`.
//! - `close` takes effect exactly once; later calls are no-ops.
//! - No session can be opened after the factory is closed.

use super::{open_db_uri, DbError, DbResult};
use crate::config::{AppConfig, DatabaseConfig};
use log::{error, info, warn};
use once_cell::sync::OnceCell;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

static FACTORY: OnceCell<SessionFactory> = OnceCell::new();
static NEXT_MEMORY_DB: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    File(PathBuf),
    /// Shared-cache URI; the data lives as long as one connection holds it.
    Memory(String),
}

impl Target {
    fn location(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory(uri) => uri.clone(),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory(_) => "memory",
        }
    }
}

/// Factory for database sessions over one configured SQLite target.
pub struct SessionFactory {
    target: Target,
    busy_timeout: Duration,
    closed: AtomicBool,
    keepalive: Mutex<Option<Connection>>,
}

impl SessionFactory {
    /// Resolves `config.url`, applies migrations and returns a ready factory.
    ///
    /// # Errors
    /// - `InvalidDatabaseUrl` when the URL names a non-SQLite target.
    /// - Any bootstrap failure from opening the first connection.
    pub fn build(config: &DatabaseConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        let target = resolve_target(&config.url)?;
        let busy_timeout = config.busy_timeout();
        info!(
            "event=session_factory_init module=db status=start mode={}",
            target.mode()
        );

        let bootstrap = match open_db_uri(&target.location(), busy_timeout) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=session_factory_init module=db status=error mode={} duration_ms={} error={}",
                    target.mode(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };
        let keepalive = match target {
            Target::Memory(_) => Some(bootstrap),
            Target::File(_) => {
                drop(bootstrap);
                None
            }
        };

        info!(
            "event=session_factory_init module=db status=ok mode={} duration_ms={}",
            target.mode(),
            started_at.elapsed().as_millis()
        );
        Ok(Self {
            target,
            busy_timeout,
            closed: AtomicBool::new(false),
            keepalive: Mutex::new(keepalive),
        })
    }

    /// Opens a new short-lived session.
    pub fn open_session(&self) -> DbResult<Session> {
        if self.is_closed() {
            return Err(DbError::FactoryClosed);
        }
        let conn = open_db_uri(&self.target.location(), self.busy_timeout)?;
        Ok(Session { conn })
    }

    /// Runs `SELECT 1` in a throwaway session. Never returns an error.
    pub fn test_connection(&self) -> bool {
        match self.round_trip() {
            Ok(()) => {
                info!("event=db_ping module=db status=ok");
                true
            }
            Err(err) => {
                error!("event=db_ping module=db status=error error={err}");
                false
            }
        }
    }

    /// Closes the factory. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        let keepalive = match self.keepalive.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(conn) = keepalive {
            if let Err((_, err)) = conn.close() {
                warn!("event=session_factory_shutdown module=db status=warn error={err}");
            }
        }

        info!(
            "event=session_factory_shutdown module=db status=ok mode={}",
            self.target.mode()
        );
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn round_trip(&self) -> DbResult<()> {
        let session = self.open_session()?;
        let tx = Transaction::new_unchecked(&session, TransactionBehavior::Deferred)?;
        tx.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        tx.commit()?;
        session.close()
    }
}

/// One open connection. Dropping it closes the connection.
pub struct Session {
    conn: Connection,
}

impl Session {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the session and reports close failures instead of ignoring them.
    pub fn close(self) -> DbResult<()> {
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

/// Builds the process-wide factory from `config` unless one already exists.
///
/// Later calls return the cached factory and ignore their argument.
pub fn initialize(config: &DatabaseConfig) -> DbResult<&'static SessionFactory> {
    FACTORY.get_or_try_init(|| SessionFactory::build(config))
}

/// Returns the process-wide factory, building it from `AppConfig::load()`
/// on first use.
pub fn get_factory() -> DbResult<&'static SessionFactory> {
    FACTORY.get_or_try_init(|| {
        let config = AppConfig::load().map_err(|err| DbError::Config(err.to_string()))?;
        SessionFactory::build(&config.database)
    })
}

/// Round-trip check against the process-wide factory.
pub fn test_connection() -> bool {
    match get_factory() {
        Ok(factory) => factory.test_connection(),
        Err(err) => {
            error!("event=db_ping module=db status=error error={err}");
            false
        }
    }
}

/// Closes the process-wide factory if it was ever built.
///
/// Returns `true` only for the call that actually closed it.
pub fn shutdown() -> bool {
    FACTORY.get().is_some_and(SessionFactory::close)
}

fn resolve_target(url: &str) -> DbResult<Target> {
    let trimmed = url.trim();
    match trimmed {
        ":memory:" | "memory" | "sqlite::memory:" => {
            let uri = format!(
                "file:relmap-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                NEXT_MEMORY_DB.fetch_add(1, Ordering::Relaxed)
            );
            return Ok(Target::Memory(uri));
        }
        "" => return Err(DbError::InvalidDatabaseUrl(url.to_string())),
        _ => {}
    }

    let path = match trimmed.strip_prefix("sqlite://") {
        Some(path) if !path.is_empty() => path,
        Some(_) => return Err(DbError::InvalidDatabaseUrl(url.to_string())),
        None if trimmed.contains("://") => {
            return Err(DbError::InvalidDatabaseUrl(url.to_string()));
        }
        None => trimmed,
    };
    Ok(Target::File(PathBuf::from(path)))
}
