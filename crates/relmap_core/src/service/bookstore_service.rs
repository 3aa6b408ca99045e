//! Bookstore chain use cases: seeding, bulk deletion and reports.

use super::sample_data::{AUTHORS, BOOKS, BOOKSTORES, PUBLISHERS};
use super::{
    delete_each, or_dash, pick, sample_date, DeleteSummary, Report, SeedOutcome, ServiceError,
    ServiceResult,
};
use crate::model::bookstore::{Author, Book, Bookstore, Publisher};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::bookstore_repo::{BookstoreRepository, SqliteBookstoreRepository};
use crate::repo::publisher_repo::{PublisherRepository, SqlitePublisherRepository};
use crate::repo::tx::within;
use log::{debug, info};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Instant;

pub struct BookstoreService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> BookstoreService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Seeds authors, publishers, books and stocked bookstores.
    ///
    /// Skipped entirely when any author already exists.
    pub fn create_sample_data(&self) -> ServiceResult<SeedOutcome> {
        let started_at = Instant::now();
        let outcome = within(self.conn, "bookstore.seed", seed)?;
        info!(
            "event=seed module=service domain=bookstore status=ok outcome={:?} duration_ms={}",
            outcome,
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }

    /// Deletes the whole domain: stock rows first, then bookstores, books,
    /// publishers and authors.
    pub fn delete_all_data(&self) -> ServiceResult<DeleteSummary> {
        let started_at = Instant::now();
        let summary = within(
            self.conn,
            "bookstore.delete_all",
            |conn: &Connection| -> ServiceResult<DeleteSummary> {
                let bookstores = SqliteBookstoreRepository::new(conn);
                let books = SqliteBookRepository::new(conn);
                let publishers = SqlitePublisherRepository::new(conn);
                let authors = SqliteAuthorRepository::new(conn);

                let join_rows = bookstores.clear_stock()?;
                let entities = vec![
                    (
                        "bookstores",
                        delete_each(bookstores.find_all()?, |s| s.id, |id| bookstores.delete(id))?,
                    ),
                    (
                        "books",
                        delete_each(books.find_all()?, |b| b.id, |id| books.delete(id))?,
                    ),
                    (
                        "publishers",
                        delete_each(publishers.find_all()?, |p| p.id, |id| publishers.delete(id))?,
                    ),
                    (
                        "authors",
                        delete_each(authors.find_all()?, |a| a.id, |id| authors.delete(id))?,
                    ),
                ];
                Ok(DeleteSummary {
                    join_rows,
                    entities,
                })
            },
        )?;
        info!(
            "event=bulk_delete module=service domain=bookstore status=ok join_rows={} duration_ms={}",
            summary.join_rows,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    pub fn books_with_publisher_and_author(&self) -> ServiceResult<Report> {
        let details = SqliteBookRepository::new(self.conn).find_all_with_publisher_and_author()?;
        let mut report = Report::new("Books with their publisher and author");
        for detail in details {
            report.line(format!(
                "Book: {} - Price: {}€ - Publisher: {} - Author: {}",
                detail.book.title,
                detail.book.price,
                detail.publisher.name,
                detail.author.full_name()
            ));
        }
        Ok(report.or_empty("No books stored."))
    }

    pub fn authors_with_books(&self) -> ServiceResult<Report> {
        let authors = SqliteAuthorRepository::new(self.conn).find_all_with_books()?;
        let mut report = Report::new("Authors with their books");
        for entry in authors {
            report.line(format!("Author: {}", entry.root.full_name()));
            if entry.related.is_empty() {
                report.line("  No associated books");
            }
            for book in &entry.related {
                report.line(format!("  - {} ({}€)", book.title, book.price));
            }
            report.blank();
        }
        Ok(report.or_empty("No authors stored."))
    }

    pub fn bookstores_with_books(&self) -> ServiceResult<Report> {
        let bookstores = SqliteBookstoreRepository::new(self.conn).find_all_with_books()?;
        let mut report = Report::new("Bookstores with their books");
        for entry in bookstores {
            let store = &entry.root;
            report.line(format!(
                "Bookstore: {} - Owner: {} - Address: {}",
                store.name,
                or_dash(store.owner_name.as_deref()),
                or_dash(store.address.as_deref())
            ));
            if entry.related.is_empty() {
                report.line("  No books in stock");
            }
            for book in &entry.related {
                report.line(format!("  - {}", book.title));
            }
            report.blank();
        }
        Ok(report.or_empty("No bookstores stored."))
    }

    pub fn books_with_bookstores(&self) -> ServiceResult<Report> {
        let books = SqliteBookRepository::new(self.conn).find_all_with_bookstores()?;
        let mut report = Report::new("Books and the bookstores stocking them");
        for entry in books {
            report.line(format!("Book: {} ({}€)", entry.root.title, entry.root.price));
            if entry.related.is_empty() {
                report.line("  Not stocked by any bookstore");
            }
            for bookstore in &entry.related {
                report.line(format!("  - Bookstore: {}", bookstore.name));
            }
            report.blank();
        }
        Ok(report.or_empty("No books stored."))
    }
}

fn seed(conn: &Connection) -> ServiceResult<SeedOutcome> {
    if SqliteAuthorRepository::new(conn).count()? > 0 {
        return Ok(SeedOutcome::AlreadyExists);
    }
    let catalog = build_catalog(conn)?;
    debug!(
        "event=seed_rows module=service domain=bookstore authors={} publishers={} books={} bookstores={}",
        catalog.authors.len(),
        catalog.publishers.len(),
        catalog.books.len(),
        catalog.bookstores.len()
    );
    Ok(SeedOutcome::Created)
}

/// Entities written by a seed, with both sides of every link filled in.
struct Catalog {
    authors: Vec<Author>,
    publishers: Vec<Publisher>,
    books: Vec<Book>,
    bookstores: Vec<Bookstore>,
}

fn build_catalog(conn: &Connection) -> ServiceResult<Catalog> {
    let author_repo = SqliteAuthorRepository::new(conn);
    let publisher_repo = SqlitePublisherRepository::new(conn);
    let book_repo = SqliteBookRepository::new(conn);
    let bookstore_repo = SqliteBookstoreRepository::new(conn);

    let mut authors = Vec::with_capacity(AUTHORS.len());
    for seed in AUTHORS {
        let born = sample_date(seed.born)?;
        authors.push(author_repo.save(Author::new(seed.name, seed.surname, Some(born)))?);
    }

    let mut publishers = Vec::with_capacity(PUBLISHERS.len());
    for seed in PUBLISHERS {
        publishers.push(publisher_repo.save(Publisher::new(
            seed.name,
            Some(seed.address.to_string()),
        ))?);
    }

    let mut books = Vec::with_capacity(BOOKS.len());
    for seed in BOOKS {
        let price = Decimal::from_str(seed.price)
            .map_err(|_| ServiceError::InconsistentState("unreadable sample book price"))?;
        let author = pick(&mut authors, seed.author)?;
        let publisher = pick(&mut publishers, seed.publisher)?;

        // The schema needs both references on insert; the helpers then mirror them.
        let mut book = Book::new(seed.title, price);
        book.author_id = author.id;
        book.publisher_id = publisher.id;
        let mut book = book_repo.save(book)?;
        author.add_book(&mut book)?;
        publisher.add_book(&mut book)?;
        books.push(book);
    }

    let mut bookstores = Vec::with_capacity(BOOKSTORES.len());
    for seed in BOOKSTORES {
        let mut bookstore = bookstore_repo.save(Bookstore::new(
            seed.name,
            Some(seed.owner.to_string()),
            Some(seed.address.to_string()),
        ))?;
        for &index in seed.books {
            let book = books
                .get_mut(index)
                .ok_or(ServiceError::InconsistentState("sample book index out of range"))?;
            bookstore_repo.add_book(&mut bookstore, book)?;
        }
        bookstores.push(bookstore);
    }

    Ok(Catalog {
        authors,
        publishers,
        books,
        bookstores,
    })
}
