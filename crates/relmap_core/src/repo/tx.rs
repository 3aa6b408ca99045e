//! Join-or-create transaction boundary shared by every repository operation.
//!
//! # Invariants
//! - With an ambient transaction open on `conn`, the unit of work joins it
//!   and never commits or rolls back.
//! - Otherwise the unit of work runs in its own immediate transaction that
//!   commits on `Ok` and is rolled back before an `Err` is returned.

use super::RepoResult;
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;

/// Runs `work` inside exactly one transaction on `conn`.
///
/// `operation` only labels diagnostics (`author.save`, `bookstore.add_book`).
///
/// Passing a `&Transaction` as `conn` (it derefs to `Connection`) is how a
/// caller composes several repository calls atomically.
pub fn in_transaction<T, F>(conn: &Connection, operation: &'static str, work: F) -> RepoResult<T>
where
    F: FnOnce(&Connection) -> RepoResult<T>,
{
    within(conn, operation, work)
}

/// [`in_transaction`] for callers with their own error type.
pub fn within<T, E, F>(conn: &Connection, operation: &'static str, work: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<rusqlite::Error> + Display,
{
    if !conn.is_autocommit() {
        debug!("event=tx_join module=repo op={operation}");
        return work(conn);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    debug!("event=tx_begin module=repo op={operation}");

    match work(&*tx) {
        Ok(value) => {
            tx.commit()?;
            debug!("event=tx_commit module=repo op={operation}");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=repo status=error op={operation} error={rollback_err}"
                );
            }
            warn!("event=tx_rollback module=repo status=ok op={operation} cause={err}");
            Err(err)
        }
    }
}

/// Opens an outer transaction that repository calls made through it will join.
///
/// Dropping the returned transaction without committing rolls it back.
pub fn begin(conn: &Connection) -> RepoResult<Transaction<'_>> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    debug!("event=tx_begin module=repo op=outer");
    Ok(tx)
}
