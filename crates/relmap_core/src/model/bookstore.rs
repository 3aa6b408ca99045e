//! Bookstore chain records.
//!
//! # Invariants
//! - A book belongs to exactly one author and one publisher once persisted.
//! - `Author::books` / `Publisher::books` list each book id at most once.
//! - `Bookstore::books` and `Book::bookstores` mirror the same join rows.

use super::{require_id, LinkError};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type AuthorId = i64;
pub type PublisherId = i64;
pub type BookId = i64;
pub type BookstoreId = i64;

/// Fraction digits kept for book prices.
pub const PRICE_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Option<AuthorId>,
    pub name: String,
    pub surname: String,
    pub birth_date: Option<NaiveDate>,
    /// Filled by `find_all_with_books`; empty otherwise.
    #[serde(default)]
    pub books: Vec<BookId>,
}

impl Author {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            surname: surname.into(),
            birth_date,
            books: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Points `book` at this author and lists it here once.
    pub fn add_book(&mut self, book: &mut Book) -> Result<(), LinkError> {
        let author_id = require_id(self.id, "author")?;
        let book_id = require_id(book.id, "book")?;
        book.author_id = Some(author_id);
        if !self.books.contains(&book_id) {
            self.books.push(book_id);
        }
        Ok(())
    }

    /// Detaches `book` from this author. Returns whether it was listed.
    pub fn remove_book(&mut self, book: &mut Book) -> bool {
        let listed = book.id.is_some_and(|book_id| {
            let before = self.books.len();
            self.books.retain(|id| *id != book_id);
            self.books.len() != before
        });
        if self.id.is_some() && book.author_id == self.id {
            book.author_id = None;
        }
        listed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: Option<PublisherId>,
    pub name: String,
    pub address: Option<String>,
    /// Filled by `find_all_with_books`; empty otherwise.
    #[serde(default)]
    pub books: Vec<BookId>,
}

impl Publisher {
    pub fn new(name: impl Into<String>, address: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            address,
            books: Vec::new(),
        }
    }

    /// Points `book` at this publisher and lists it here once.
    pub fn add_book(&mut self, book: &mut Book) -> Result<(), LinkError> {
        let publisher_id = require_id(self.id, "publisher")?;
        let book_id = require_id(book.id, "book")?;
        book.publisher_id = Some(publisher_id);
        if !self.books.contains(&book_id) {
            self.books.push(book_id);
        }
        Ok(())
    }

    /// Detaches `book` from this publisher. Returns whether it was listed.
    pub fn remove_book(&mut self, book: &mut Book) -> bool {
        let listed = book.id.is_some_and(|book_id| {
            let before = self.books.len();
            self.books.retain(|id| *id != book_id);
            self.books.len() != before
        });
        if self.id.is_some() && book.publisher_id == self.id {
            book.publisher_id = None;
        }
        listed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<BookId>,
    pub title: String,
    pub price: Decimal,
    /// Required by storage; `None` only while detached in memory.
    pub author_id: Option<AuthorId>,
    /// Required by storage; `None` only while detached in memory.
    pub publisher_id: Option<PublisherId>,
    /// Filled by `find_all_with_bookstores`; empty otherwise.
    #[serde(default)]
    pub bookstores: BTreeSet<BookstoreId>,
}

impl Book {
    /// Creates an unlinked book; `price` is rounded to two fraction digits.
    pub fn new(title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: None,
            title: title.into(),
            price: normalize_price(price),
            author_id: None,
            publisher_id: None,
            bookstores: BTreeSet::new(),
        }
    }

    pub fn add_bookstore(&mut self, bookstore: &mut Bookstore) -> Result<bool, LinkError> {
        bookstore.add_book(self)
    }

    pub fn remove_bookstore(&mut self, bookstore: &mut Bookstore) -> bool {
        bookstore.remove_book(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookstore {
    pub id: Option<BookstoreId>,
    pub name: String,
    pub owner_name: Option<String>,
    pub address: Option<String>,
    /// Filled by `find_all_with_books`; empty otherwise.
    #[serde(default)]
    pub books: BTreeSet<BookId>,
}

impl Bookstore {
    pub fn new(name: impl Into<String>, owner_name: Option<String>, address: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            owner_name,
            address,
            books: BTreeSet::new(),
        }
    }

    /// Records the pairing on both sides. Returns `false` if it already existed.
    pub fn add_book(&mut self, book: &mut Book) -> Result<bool, LinkError> {
        let bookstore_id = require_id(self.id, "bookstore")?;
        let book_id = require_id(book.id, "book")?;
        let added = self.books.insert(book_id);
        book.bookstores.insert(bookstore_id);
        Ok(added)
    }

    /// Drops the pairing on both sides. Returns whether this side listed it.
    pub fn remove_book(&mut self, book: &mut Book) -> bool {
        if let Some(bookstore_id) = self.id {
            book.bookstores.remove(&bookstore_id);
        }
        book.id.is_some_and(|book_id| self.books.remove(&book_id))
    }
}

/// A book read together with its author and publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub book: Book,
    pub author: Author,
    pub publisher: Publisher,
}

/// Rounds half away from zero to `PRICE_SCALE` digits, padding shorter values.
pub(crate) fn normalize_price(price: Decimal) -> Decimal {
    let mut price =
        price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(PRICE_SCALE);
    price
}

#[cfg(test)]
mod tests {
    use super::{normalize_price, Author, Book, Bookstore, Publisher};
    use crate::model::LinkError;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn saved_book(id: i64) -> Book {
        let mut book = Book::new("Eva Luna", Decimal::from_str("19.99").unwrap());
        book.id = Some(id);
        book
    }

    #[test]
    fn price_is_kept_with_two_fraction_digits() {
        let book = Book::new("x", Decimal::from_str("22.5").unwrap());
        assert_eq!(book.price.to_string(), "22.50");
        let rounded = Book::new("y", Decimal::from_str("18.987").unwrap());
        assert_eq!(rounded.price.to_string(), "18.99");
    }

    #[test]
    fn author_add_book_links_both_sides_once() {
        let mut author = Author::new("Isabel", "Allende", None);
        author.id = Some(7);
        let mut book = saved_book(3);

        author.add_book(&mut book).unwrap();
        author.add_book(&mut book).unwrap();

        assert_eq!(author.books, vec![3]);
        assert_eq!(book.author_id, Some(7));

        assert!(author.remove_book(&mut book));
        assert!(author.books.is_empty());
        assert_eq!(book.author_id, None);
        assert!(!author.remove_book(&mut book));
    }

    #[test]
    fn publisher_remove_book_leaves_foreign_link_untouched() {
        let mut first = Publisher::new("Planeta", None);
        first.id = Some(1);
        let mut second = Publisher::new("Penguin Random House", None);
        second.id = Some(2);
        let mut book = saved_book(9);

        second.add_book(&mut book).unwrap();
        assert!(!first.remove_book(&mut book));
        assert_eq!(book.publisher_id, Some(2));
    }

    #[test]
    fn unsaved_entities_cannot_be_linked() {
        let mut author = Author::new("Mario", "Vargas Llosa", None);
        let mut book = saved_book(1);
        assert_eq!(
            author.add_book(&mut book),
            Err(LinkError { entity: "author" })
        );

        let mut store = Bookstore::new("Libros y Más", None, None);
        store.id = Some(4);
        let mut draft = Book::new("draft", Decimal::ONE);
        assert_eq!(store.add_book(&mut draft), Err(LinkError { entity: "book" }));
        assert!(draft.bookstores.is_empty());
    }

    #[test]
    fn bookstore_pairing_is_mirrored_and_idempotent() {
        let mut store = Bookstore::new("El Rincón Literario", Some("Ana Gómez".into()), None);
        store.id = Some(5);
        let mut book = saved_book(2);

        assert!(store.add_book(&mut book).unwrap());
        assert!(!book.add_bookstore(&mut store).unwrap());
        assert_eq!(store.books.len(), 1);
        assert!(book.bookstores.contains(&5));

        assert!(book.remove_bookstore(&mut store));
        assert!(store.books.is_empty());
        assert!(book.bookstores.is_empty());
    }

    #[test]
    fn price_midpoints_round_away_from_zero() {
        let price = |raw: &str| Decimal::from_str(raw).unwrap();

        assert_eq!(normalize_price(price("18.985")).to_string(), "18.99");
        assert_eq!(normalize_price(price("18.975")).to_string(), "18.98");
        assert_eq!(normalize_price(price("18.984")).to_string(), "18.98");
        assert_eq!(normalize_price(price("20")).to_string(), "20.00");
    }

    #[test]
    fn book_serializes_price_as_exact_text() {
        let book = Book::new("Cien años de soledad", Decimal::from_str("25.99").unwrap());
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["price"], "25.99");
        assert_eq!(json["bookstores"], serde_json::json!([]));
    }
}
