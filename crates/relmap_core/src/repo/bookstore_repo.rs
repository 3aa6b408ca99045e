//! Bookstore repository: bookstores and their stock (the `bookstore_books`
//! join table).
//!
//! # Invariants
//! - A bookstore/book pair has at most one join row.
//! - A bookstore with stock rows cannot be deleted until they are removed.

use super::table::{self, opt_text, text, Table};
use super::tx::in_transaction;
use super::{RepoError, RepoResult};
use crate::model::bookstore::{Book, Bookstore, BookstoreId};
use crate::model::WithMany;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;

const STOCK_TABLE: &str = "bookstore_books";

impl Table for Bookstore {
    const ENTITY: &'static str = "bookstore";
    const TABLE: &'static str = "bookstores";
    const COLUMNS: &'static [&'static str] = &["name", "owner_name", "address"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            opt_text(self.owner_name.as_deref()),
            opt_text(self.address.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            owner_name: row.get(offset + 2)?,
            address: row.get(offset + 3)?,
            books: BTreeSet::new(),
        })
    }
}

pub trait BookstoreRepository {
    fn save(&self, bookstore: Bookstore) -> RepoResult<Bookstore>;
    fn find_by_id(&self, id: BookstoreId) -> RepoResult<Option<Bookstore>>;
    fn find_all(&self) -> RepoResult<Vec<Bookstore>>;
    /// Every bookstore with the books it stocks.
    fn find_all_with_books(&self) -> RepoResult<Vec<WithMany<Bookstore, Book>>>;
    fn update(&self, bookstore: Bookstore) -> RepoResult<Bookstore>;
    fn delete(&self, id: BookstoreId) -> RepoResult<()>;

    /// Stocks `book` in `bookstore` and mirrors the pairing on both values.
    ///
    /// Returns `false` when the pairing already existed; no row is added.
    fn add_book(&self, bookstore: &mut Bookstore, book: &mut Book) -> RepoResult<bool>;
    /// Removes `book` from `bookstore` on both values. Returns whether a row went away.
    fn remove_book(&self, bookstore: &mut Bookstore, book: &mut Book) -> RepoResult<bool>;
    /// Deletes every stock row with one statement. Returns the number removed.
    fn clear_stock(&self) -> RepoResult<usize>;
}

pub struct SqliteBookstoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookstoreRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookstoreRepository for SqliteBookstoreRepository<'_> {
    fn save(&self, mut bookstore: Bookstore) -> RepoResult<Bookstore> {
        in_transaction(self.conn, "bookstore.save", |conn| {
            table::insert(conn, &mut bookstore)?;
            Ok(bookstore)
        })
    }

    fn find_by_id(&self, id: BookstoreId) -> RepoResult<Option<Bookstore>> {
        in_transaction(self.conn, "bookstore.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Bookstore>> {
        in_transaction(self.conn, "bookstore.find_all", table::find_all::<Bookstore>)
    }

    fn find_all_with_books(&self) -> RepoResult<Vec<WithMany<Bookstore, Book>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM bookstores s
             LEFT JOIN {STOCK_TABLE} bb ON bb.bookstore_id = s.id
             LEFT JOIN books b ON b.id = bb.book_id
             ORDER BY s.id ASC, b.id ASC;",
            Bookstore::select_list("s"),
            Book::select_list("b"),
        );
        in_transaction(self.conn, "bookstore.find_all_with_books", |conn| {
            table::query_with_many(conn, &sql, |bookstore: &mut Bookstore, book: &mut Book| {
                bookstore.add_book(book)?;
                Ok(())
            })
        })
    }

    fn update(&self, bookstore: Bookstore) -> RepoResult<Bookstore> {
        in_transaction(self.conn, "bookstore.update", |conn| {
            table::update(conn, &bookstore)?;
            Ok(bookstore)
        })
    }

    fn delete(&self, id: BookstoreId) -> RepoResult<()> {
        in_transaction(self.conn, "bookstore.delete", |conn| {
            table::delete_by_id::<Bookstore>(conn, id)?;
            Ok(())
        })
    }

    fn add_book(&self, bookstore: &mut Bookstore, book: &mut Book) -> RepoResult<bool> {
        let (bookstore_id, book_id) = pair_ids(bookstore, book)?;
        let inserted = in_transaction(self.conn, "bookstore.add_book", |conn| {
            table::ensure_exists::<Bookstore>(conn, bookstore_id)?;
            table::ensure_exists::<Book>(conn, book_id)?;
            let changed = conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO {STOCK_TABLE} (bookstore_id, book_id) VALUES (?1, ?2);"
                ),
                params![bookstore_id, book_id],
            )?;
            Ok(changed > 0)
        })?;

        bookstore.add_book(book)?;
        Ok(inserted)
    }

    fn remove_book(&self, bookstore: &mut Bookstore, book: &mut Book) -> RepoResult<bool> {
        let (bookstore_id, book_id) = pair_ids(bookstore, book)?;
        let removed = in_transaction(self.conn, "bookstore.remove_book", |conn| {
            let changed = conn.execute(
                &format!("DELETE FROM {STOCK_TABLE} WHERE bookstore_id = ?1 AND book_id = ?2;"),
                params![bookstore_id, book_id],
            )?;
            Ok(changed > 0)
        })?;

        bookstore.remove_book(book);
        Ok(removed)
    }

    fn clear_stock(&self) -> RepoResult<usize> {
        // Bypasses entity-level checks; keep STOCK_TABLE in sync with the schema.
        let removed = in_transaction(self.conn, "bookstore.clear_stock", |conn| {
            Ok(conn.execute(&format!("DELETE FROM {STOCK_TABLE};"), [])?)
        })?;
        info!("event=join_clear module=repo table={STOCK_TABLE} rows={removed}");
        Ok(removed)
    }
}

fn pair_ids(bookstore: &Bookstore, book: &Book) -> RepoResult<(i64, i64)> {
    let bookstore_id = bookstore.id.ok_or(RepoError::Unsaved {
        entity: Bookstore::ENTITY,
    })?;
    let book_id = book.id.ok_or(RepoError::Unsaved {
        entity: Book::ENTITY,
    })?;
    Ok((bookstore_id, book_id))
}
