use chrono::NaiveDate;
use relmap_core::db::open_db_in_memory;
use relmap_core::model::bookstore::{Author, Book, Bookstore, Publisher};
use relmap_core::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use relmap_core::repo::book_repo::{BookRepository, SqliteBookRepository};
use relmap_core::repo::bookstore_repo::{BookstoreRepository, SqliteBookstoreRepository};
use relmap_core::repo::publisher_repo::{PublisherRepository, SqlitePublisherRepository};
use relmap_core::{ConstraintKind, RepoError};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

#[test]
fn author_save_then_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::new(&conn);

    let saved = repo
        .save(Author::new(
            "Isabel",
            "Allende",
            NaiveDate::from_ymd_opt(1942, 8, 2),
        ))
        .unwrap();
    let id = saved.id.unwrap();

    assert_eq!(repo.find_by_id(id).unwrap(), Some(saved));
    assert_eq!(repo.find_by_id(id + 100).unwrap(), None);
}

#[test]
fn book_roundtrip_keeps_exact_price() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let repo = SqliteBookRepository::new(&conn);

    let mut book = Book::new("La casa de los espíritus", Decimal::new(2299, 2));
    book.author_id = author.id;
    book.publisher_id = publisher.id;
    let saved = repo.save(book).unwrap();

    let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.price.to_string(), "22.99");
}

#[test]
fn writes_round_price_to_two_fraction_digits() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let repo = SqliteBookRepository::new(&conn);

    let mut book = save_book(&conn, "Paula", &author, &publisher);
    book.price = Decimal::from_str("18.987").unwrap();
    let updated = repo.update(book).unwrap();

    let loaded = repo.find_by_id(updated.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.price.to_string(), "18.99");
    assert_eq!(loaded.price.scale(), 2);
    assert_eq!(loaded, updated);

    let mut midpoint = Book::new("Eva Luna", Decimal::ZERO);
    midpoint.price = Decimal::from_str("18.985").unwrap();
    midpoint.author_id = author.id;
    midpoint.publisher_id = publisher.id;
    let saved = repo.save(midpoint).unwrap();
    let stored: String = conn
        .query_row(
            "SELECT price FROM books WHERE id = ?1;",
            [saved.id.unwrap()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "18.99");
    assert_eq!(saved.price.to_string(), "18.99");
}

#[test]
fn publisher_save_then_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublisherRepository::new(&conn);

    let saved = repo
        .save(Publisher::new(
            "Penguin Random House",
            Some("1745 Broadway, New York".into()),
        ))
        .unwrap();
    let bare = repo.save(Publisher::new("Anagrama", None)).unwrap();

    assert_eq!(repo.find_by_id(saved.id.unwrap()).unwrap(), Some(saved));
    assert_eq!(repo.find_by_id(bare.id.unwrap()).unwrap(), Some(bare));
}

#[test]
fn bookstore_save_then_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookstoreRepository::new(&conn);

    let saved = repo
        .save(Bookstore::new(
            "El Rincón Literario",
            Some("Ana Gómez".into()),
            Some("Calle Mayor 5, Madrid".into()),
        ))
        .unwrap();
    let bare = repo.save(Bookstore::new("Sin dueño", None, None)).unwrap();

    assert_eq!(repo.find_by_id(saved.id.unwrap()).unwrap(), Some(saved));
    assert_eq!(repo.find_by_id(bare.id.unwrap()).unwrap(), Some(bare));
}

#[test]
fn update_changes_columns_and_rejects_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublisherRepository::new(&conn);

    let mut publisher = repo
        .save(Publisher::new("Planeta", Some("Barcelona".into())))
        .unwrap();
    publisher.address = Some("Madrid".into());
    let updated = repo.update(publisher).unwrap();
    assert_eq!(
        repo.find_by_id(updated.id.unwrap()).unwrap().unwrap().address,
        Some("Madrid".to_string())
    );

    let mut ghost = updated.clone();
    ghost.id = Some(999);
    assert!(matches!(
        repo.update(ghost),
        Err(RepoError::NotFound { id: 999, .. })
    ));
    assert!(matches!(
        repo.update(Publisher::new("Unsaved", None)),
        Err(RepoError::Unsaved { .. })
    ));
}

#[test]
fn deleting_missing_rows_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookstoreRepository::new(&conn);

    repo.delete(42).unwrap();
    repo.delete(42).unwrap();

    let saved = repo
        .save(Bookstore::new("Casa del Libro", None, None))
        .unwrap();
    repo.delete(saved.id.unwrap()).unwrap();
    assert!(repo.find_by_id(saved.id.unwrap()).unwrap().is_none());
}

#[test]
fn find_all_with_publisher_and_author_loads_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let authors = SqliteAuthorRepository::new(&conn);
    let publishers = SqlitePublisherRepository::new(&conn);
    let books = SqliteBookRepository::new(&conn);

    let author = authors
        .save(Author::new(
            "Gabriel",
            "García Márquez",
            NaiveDate::from_ymd_opt(1927, 3, 6),
        ))
        .unwrap();
    let publisher = publishers
        .save(Publisher::new(
            "Penguin Random House",
            Some("1745 Broadway, New York".into()),
        ))
        .unwrap();
    let mut book = Book::new("Cien años de soledad", Decimal::new(2599, 2));
    book.author_id = author.id;
    book.publisher_id = publisher.id;
    books.save(book).unwrap();

    let details = books.find_all_with_publisher_and_author().unwrap();
    assert_eq!(details.len(), 1);
    let entry = &details[0];
    assert_eq!(entry.book.title, "Cien años de soledad");
    assert_eq!(entry.author.surname, "García Márquez");
    assert_eq!(entry.publisher.name, "Penguin Random House");
    assert_eq!(entry.author.books, vec![entry.book.id.unwrap()]);
    assert_eq!(entry.publisher.books, vec![entry.book.id.unwrap()]);
}

#[test]
fn find_all_with_books_lists_each_authors_books() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let lonely = SqliteAuthorRepository::new(&conn)
        .save(Author::new("Laura", "Esquivel", None))
        .unwrap();
    let first = save_book(&conn, "Paula", &author, &publisher);
    let second = save_book(&conn, "Eva Luna", &author, &publisher);

    let loaded = SqliteAuthorRepository::new(&conn)
        .find_all_with_books()
        .unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].root.id, author.id);
    assert_eq!(
        loaded[0].related.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
    assert_eq!(loaded[0].root.books.len(), 2);
    assert_eq!(loaded[1].root.id, lonely.id);
    assert!(loaded[1].related.is_empty());
}

#[test]
fn add_book_is_visible_from_both_sides_and_never_duplicated() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let repo = SqliteBookstoreRepository::new(&conn);

    let mut store = repo
        .save(Bookstore::new("El Ateneo", Some("Ana".into()), None))
        .unwrap();
    let mut book = save_book(&conn, "Paula", &author, &publisher);

    assert!(repo.add_book(&mut store, &mut book).unwrap());
    assert!(!repo.add_book(&mut store, &mut book).unwrap());
    assert_eq!(stock_rows(&conn), 1);
    assert!(store.books.contains(&book.id.unwrap()));
    assert!(book.bookstores.contains(&store.id.unwrap()));

    let stores = repo.find_all_with_books().unwrap();
    assert_eq!(stores[0].related.len(), 1);
    assert_eq!(stores[0].related[0].id, book.id);

    let books = SqliteBookRepository::new(&conn)
        .find_all_with_bookstores()
        .unwrap();
    assert_eq!(books[0].related.len(), 1);
    assert_eq!(books[0].related[0].id, store.id);
    assert!(books[0].root.bookstores.contains(&store.id.unwrap()));
}

#[test]
fn remove_book_drops_the_pairing_on_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let repo = SqliteBookstoreRepository::new(&conn);

    let mut store = repo.save(Bookstore::new("Gandhi", None, None)).unwrap();
    let mut book = save_book(&conn, "Paula", &author, &publisher);
    repo.add_book(&mut store, &mut book).unwrap();

    assert!(repo.remove_book(&mut store, &mut book).unwrap());
    assert!(!repo.remove_book(&mut store, &mut book).unwrap());
    assert_eq!(stock_rows(&conn), 0);
    assert!(store.books.is_empty());
    assert!(book.bookstores.is_empty());
}

#[test]
fn add_book_requires_saved_and_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let repo = SqliteBookstoreRepository::new(&conn);
    let mut book = save_book(&conn, "Paula", &author, &publisher);

    let mut unsaved = Bookstore::new("Draft", None, None);
    assert!(matches!(
        repo.add_book(&mut unsaved, &mut book),
        Err(RepoError::Unsaved { .. })
    ));

    let mut vanished = repo.save(Bookstore::new("Closed", None, None)).unwrap();
    repo.delete(vanished.id.unwrap()).unwrap();
    assert!(matches!(
        repo.add_book(&mut vanished, &mut book),
        Err(RepoError::NotFound { .. })
    ));
    assert_eq!(stock_rows(&conn), 0);
}

#[test]
fn book_without_author_violates_not_null() {
    let conn = open_db_in_memory().unwrap();
    let (_, publisher) = author_and_publisher(&conn);

    let mut book = Book::new("Orphan", Decimal::new(1000, 2));
    book.publisher_id = publisher.id;
    let err = SqliteBookRepository::new(&conn).save(book).unwrap_err();

    assert_eq!(err.constraint_kind(), Some(ConstraintKind::NotNull));
}

#[test]
fn book_with_unknown_publisher_violates_foreign_key() {
    let conn = open_db_in_memory().unwrap();
    let (author, _) = author_and_publisher(&conn);

    let mut book = Book::new("Ghost edition", Decimal::new(1000, 2));
    book.author_id = author.id;
    book.publisher_id = Some(999);
    let err = SqliteBookRepository::new(&conn).save(book).unwrap_err();

    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    assert!(SqliteBookRepository::new(&conn).find_all().unwrap().is_empty());
}

#[test]
fn stocked_bookstore_cannot_be_deleted_before_clearing_stock() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    let repo = SqliteBookstoreRepository::new(&conn);
    let mut store = repo.save(Bookstore::new("Gandhi", None, None)).unwrap();
    let mut book = save_book(&conn, "Paula", &author, &publisher);
    repo.add_book(&mut store, &mut book).unwrap();

    let err = repo.delete(store.id.unwrap()).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    assert!(repo.find_by_id(store.id.unwrap()).unwrap().is_some());

    assert_eq!(repo.clear_stock().unwrap(), 1);
    repo.delete(store.id.unwrap()).unwrap();
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn author_with_books_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let (author, publisher) = author_and_publisher(&conn);
    save_book(&conn, "Paula", &author, &publisher);

    let err = SqliteAuthorRepository::new(&conn)
        .delete(author.id.unwrap())
        .unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
}

fn author_and_publisher(conn: &Connection) -> (Author, Publisher) {
    let author = SqliteAuthorRepository::new(conn)
        .save(Author::new("Isabel", "Allende", None))
        .unwrap();
    let publisher = SqlitePublisherRepository::new(conn)
        .save(Publisher::new("Plaza & Janés", None))
        .unwrap();
    (author, publisher)
}

fn save_book(conn: &Connection, title: &str, author: &Author, publisher: &Publisher) -> Book {
    let mut book = Book::new(title, Decimal::new(1999, 2));
    book.author_id = author.id;
    book.publisher_id = publisher.id;
    SqliteBookRepository::new(conn).save(book).unwrap()
}

fn stock_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM bookstore_books;", [], |row| row.get(0))
        .unwrap()
}
