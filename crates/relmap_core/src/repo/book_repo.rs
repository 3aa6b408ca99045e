//! Book repository contract and SQLite implementation.
//!
//! # Invariants
//! - `price` is stored as exact decimal text with two fraction digits and
//!   must parse back losslessly. Every write rounds it first.
//! - `author_id` and `publisher_id` are required by the schema; saving a
//!   detached book fails with a not-null constraint violation.

use super::table::{self, opt_id, Table};
use super::tx::in_transaction;
use super::{RepoError, RepoResult};
use crate::model::bookstore::{
    normalize_price, Author, Book, BookDetails, BookId, Bookstore, Publisher,
};
use crate::model::WithMany;
use rust_decimal::Decimal;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::collections::BTreeSet;
use std::str::FromStr;

impl Table for Book {
    const ENTITY: &'static str = "book";
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["title", "price", "author_id", "publisher_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(normalize_price(self.price).to_string()),
            opt_id(self.author_id),
            opt_id(self.publisher_id),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        let id: BookId = row.get(offset)?;
        let raw_price: String = row.get(offset + 2)?;
        let price = Decimal::from_str(&raw_price).map_err(|err| {
            RepoError::InvalidData(format!("book {id} has unreadable price `{raw_price}`: {err}"))
        })?;

        Ok(Self {
            id: Some(id),
            title: row.get(offset + 1)?,
            price,
            author_id: row.get(offset + 3)?,
            publisher_id: row.get(offset + 4)?,
            bookstores: BTreeSet::new(),
        })
    }
}

pub trait BookRepository {
    fn save(&self, book: Book) -> RepoResult<Book>;
    fn find_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn find_all(&self) -> RepoResult<Vec<Book>>;
    /// Every book with its author and publisher in one query.
    fn find_all_with_publisher_and_author(&self) -> RepoResult<Vec<BookDetails>>;
    /// Every book with the bookstores that stock it.
    fn find_all_with_bookstores(&self) -> RepoResult<Vec<WithMany<Book, Bookstore>>>;
    fn update(&self, book: Book) -> RepoResult<Book>;
    fn delete(&self, id: BookId) -> RepoResult<()>;
}

pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn save(&self, mut book: Book) -> RepoResult<Book> {
        book.price = normalize_price(book.price);
        in_transaction(self.conn, "book.save", |conn| {
            table::insert(conn, &mut book)?;
            Ok(book)
        })
    }

    fn find_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        in_transaction(self.conn, "book.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Book>> {
        in_transaction(self.conn, "book.find_all", table::find_all::<Book>)
    }

    fn find_all_with_publisher_and_author(&self) -> RepoResult<Vec<BookDetails>> {
        let sql = format!(
            "SELECT {}, {}, {}
             FROM books b
             JOIN authors a ON a.id = b.author_id
             JOIN publishers p ON p.id = b.publisher_id
             ORDER BY b.id ASC;",
            Book::select_list("b"),
            Author::select_list("a"),
            Publisher::select_list("p"),
        );
        let author_offset = Book::width();
        let publisher_offset = author_offset + Author::width();

        in_transaction(self.conn, "book.find_all_with_publisher_and_author", |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            let mut details = Vec::new();
            while let Some(row) = rows.next()? {
                let mut book = Book::from_row(row, 0)?;
                let mut author = Author::from_row(row, author_offset)?;
                let mut publisher = Publisher::from_row(row, publisher_offset)?;
                author.add_book(&mut book)?;
                publisher.add_book(&mut book)?;
                details.push(BookDetails {
                    book,
                    author,
                    publisher,
                });
            }
            Ok(details)
        })
    }

    fn find_all_with_bookstores(&self) -> RepoResult<Vec<WithMany<Book, Bookstore>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM books b
             LEFT JOIN bookstore_books bb ON bb.book_id = b.id
             LEFT JOIN bookstores s ON s.id = bb.bookstore_id
             ORDER BY b.id ASC, s.id ASC;",
            Book::select_list("b"),
            Bookstore::select_list("s"),
        );
        in_transaction(self.conn, "book.find_all_with_bookstores", |conn| {
            table::query_with_many(conn, &sql, |book: &mut Book, bookstore: &mut Bookstore| {
                bookstore.add_book(book)?;
                Ok(())
            })
        })
    }

    fn update(&self, mut book: Book) -> RepoResult<Book> {
        book.price = normalize_price(book.price);
        in_transaction(self.conn, "book.update", |conn| {
            table::update(conn, &book)?;
            Ok(book)
        })
    }

    fn delete(&self, id: BookId) -> RepoResult<()> {
        in_transaction(self.conn, "book.delete", |conn| {
            table::delete_by_id::<Book>(conn, id)?;
            Ok(())
        })
    }
}
