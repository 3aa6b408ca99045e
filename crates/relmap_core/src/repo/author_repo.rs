//! Author repository contract and SQLite implementation.

use super::table::{self, opt_date, text, Table};
use super::tx::in_transaction;
use super::RepoResult;
use crate::model::bookstore::{Author, AuthorId, Book};
use crate::model::WithMany;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

impl Table for Author {
    const ENTITY: &'static str = "author";
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["name", "surname", "birth_date"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.surname), opt_date(self.birth_date)]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            surname: row.get(offset + 2)?,
            birth_date: row.get(offset + 3)?,
            books: Vec::new(),
        })
    }
}

pub trait AuthorRepository {
    fn save(&self, author: Author) -> RepoResult<Author>;
    fn find_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn find_all(&self) -> RepoResult<Vec<Author>>;
    /// Every author with the books they wrote, authors without books included.
    fn find_all_with_books(&self) -> RepoResult<Vec<WithMany<Author, Book>>>;
    fn update(&self, author: Author) -> RepoResult<Author>;
    fn delete(&self, id: AuthorId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<i64>;
}

pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn save(&self, mut author: Author) -> RepoResult<Author> {
        in_transaction(self.conn, "author.save", |conn| {
            table::insert(conn, &mut author)?;
            Ok(author)
        })
    }

    fn find_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        in_transaction(self.conn, "author.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Author>> {
        in_transaction(self.conn, "author.find_all", table::find_all::<Author>)
    }

    fn find_all_with_books(&self) -> RepoResult<Vec<WithMany<Author, Book>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM authors a
             LEFT JOIN books b ON b.author_id = a.id
             ORDER BY a.id ASC, b.id ASC;",
            Author::select_list("a"),
            Book::select_list("b"),
        );
        in_transaction(self.conn, "author.find_all_with_books", |conn| {
            table::query_with_many(conn, &sql, |author: &mut Author, book: &mut Book| {
                Ok(author.add_book(book)?)
            })
        })
    }

    fn update(&self, author: Author) -> RepoResult<Author> {
        in_transaction(self.conn, "author.update", |conn| {
            table::update(conn, &author)?;
            Ok(author)
        })
    }

    fn delete(&self, id: AuthorId) -> RepoResult<()> {
        in_transaction(self.conn, "author.delete", |conn| {
            table::delete_by_id::<Author>(conn, id)?;
            Ok(())
        })
    }

    fn count(&self) -> RepoResult<i64> {
        in_transaction(self.conn, "author.count", table::count::<Author>)
    }
}
