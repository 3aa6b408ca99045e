use relmap_core::db::session;
use relmap_core::{DatabaseConfig, DbError, SessionFactory};

#[test]
fn sessions_from_memory_factory_share_one_database() {
    let factory = SessionFactory::build(&DatabaseConfig::in_memory()).unwrap();

    let writer = factory.open_session().unwrap();
    writer
        .execute("INSERT INTO authors (name, surname) VALUES ('Isabel', 'Allende');", [])
        .unwrap();
    writer.close().unwrap();

    let reader = factory.open_session().unwrap();
    let count: i64 = reader
        .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn separate_memory_factories_are_isolated() {
    let first = SessionFactory::build(&DatabaseConfig::in_memory()).unwrap();
    let second = SessionFactory::build(&DatabaseConfig::in_memory()).unwrap();

    first
        .open_session()
        .unwrap()
        .execute("INSERT INTO departments (name) VALUES ('Sales');", [])
        .unwrap();

    let count: i64 = second
        .open_session()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM departments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn file_factory_persists_across_factories() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("shop.sqlite3").display()),
        ..DatabaseConfig::default()
    };

    let factory = SessionFactory::build(&config).unwrap();
    assert!(factory.test_connection());
    factory
        .open_session()
        .unwrap()
        .execute("INSERT INTO publishers (name) VALUES ('Planeta');", [])
        .unwrap();
    assert!(factory.close());

    let reopened = SessionFactory::build(&config).unwrap();
    let count: i64 = reopened
        .open_session()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM publishers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn close_is_idempotent_and_blocks_new_sessions() {
    let factory = SessionFactory::build(&DatabaseConfig::in_memory()).unwrap();

    assert!(factory.close());
    assert!(!factory.close());
    assert!(factory.is_closed());
    assert!(!factory.test_connection());
    assert!(matches!(
        factory.open_session(),
        Err(DbError::FactoryClosed)
    ));
}

#[test]
fn unsupported_url_fails_to_build() {
    let config = DatabaseConfig {
        url: "mysql://localhost/shop".to_string(),
        ..DatabaseConfig::default()
    };
    assert!(matches!(
        SessionFactory::build(&config),
        Err(DbError::InvalidDatabaseUrl(_))
    ));
}

#[test]
fn global_factory_lifecycle() {
    let factory = session::initialize(&DatabaseConfig::in_memory()).unwrap();
    let again = session::initialize(&DatabaseConfig::default()).unwrap();
    assert!(std::ptr::eq(factory, again));

    assert!(session::test_connection());
    assert!(session::shutdown());
    assert!(!session::shutdown());
    assert!(!session::test_connection());
}
