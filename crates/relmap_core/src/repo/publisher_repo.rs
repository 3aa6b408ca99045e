//! Publisher repository contract and SQLite implementation.

use super::table::{self, opt_text, text, Table};
use super::tx::in_transaction;
use super::RepoResult;
use crate::model::bookstore::{Book, Publisher, PublisherId};
use crate::model::WithMany;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

impl Table for Publisher {
    const ENTITY: &'static str = "publisher";
    const TABLE: &'static str = "publishers";
    const COLUMNS: &'static [&'static str] = &["name", "address"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(self.address.as_deref())]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            address: row.get(offset + 2)?,
            books: Vec::new(),
        })
    }
}

pub trait PublisherRepository {
    fn save(&self, publisher: Publisher) -> RepoResult<Publisher>;
    fn find_by_id(&self, id: PublisherId) -> RepoResult<Option<Publisher>>;
    fn find_all(&self) -> RepoResult<Vec<Publisher>>;
    fn find_all_with_books(&self) -> RepoResult<Vec<WithMany<Publisher, Book>>>;
    fn update(&self, publisher: Publisher) -> RepoResult<Publisher>;
    fn delete(&self, id: PublisherId) -> RepoResult<()>;
}

pub struct SqlitePublisherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublisherRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PublisherRepository for SqlitePublisherRepository<'_> {
    fn save(&self, mut publisher: Publisher) -> RepoResult<Publisher> {
        in_transaction(self.conn, "publisher.save", |conn| {
            table::insert(conn, &mut publisher)?;
            Ok(publisher)
        })
    }

    fn find_by_id(&self, id: PublisherId) -> RepoResult<Option<Publisher>> {
        in_transaction(self.conn, "publisher.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Publisher>> {
        in_transaction(self.conn, "publisher.find_all", table::find_all::<Publisher>)
    }

    fn find_all_with_books(&self) -> RepoResult<Vec<WithMany<Publisher, Book>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM publishers p
             LEFT JOIN books b ON b.publisher_id = p.id
             ORDER BY p.id ASC, b.id ASC;",
            Publisher::select_list("p"),
            Book::select_list("b"),
        );
        in_transaction(self.conn, "publisher.find_all_with_books", |conn| {
            table::query_with_many(conn, &sql, |publisher: &mut Publisher, book: &mut Book| {
                Ok(publisher.add_book(book)?)
            })
        })
    }

    fn update(&self, publisher: Publisher) -> RepoResult<Publisher> {
        in_transaction(self.conn, "publisher.update", |conn| {
            table::update(conn, &publisher)?;
            Ok(publisher)
        })
    }

    fn delete(&self, id: PublisherId) -> RepoResult<()> {
        in_transaction(self.conn, "publisher.delete", |conn| {
            table::delete_by_id::<Publisher>(conn, id)?;
            Ok(())
        })
    }
}
