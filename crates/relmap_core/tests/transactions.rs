use relmap_core::db::open_db_in_memory;
use relmap_core::model::company::{Department, Employee};
use relmap_core::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use relmap_core::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use relmap_core::repo::tx::{begin, in_transaction};
use relmap_core::{ConstraintKind, RepoError};

#[test]
fn repository_call_commits_its_own_transaction() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDepartmentRepository::new(&conn);

    repo.save(Department::new("Sales", None, None)).unwrap();

    assert!(conn.is_autocommit());
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn rolling_back_outer_transaction_undoes_joined_saves() {
    let conn = open_db_in_memory().unwrap();

    let tx = begin(&conn).unwrap();
    let repo = SqliteDepartmentRepository::new(&tx);
    repo.save(Department::new("Sales", None, None)).unwrap();
    repo.save(Department::new("Support", None, None)).unwrap();
    assert_eq!(repo.count().unwrap(), 2);
    tx.rollback().unwrap();

    assert_eq!(SqliteDepartmentRepository::new(&conn).count().unwrap(), 0);
}

#[test]
fn committing_outer_transaction_keeps_joined_saves() {
    let conn = open_db_in_memory().unwrap();

    let tx = begin(&conn).unwrap();
    SqliteDepartmentRepository::new(&tx)
        .save(Department::new("Sales", None, None))
        .unwrap();
    tx.commit().unwrap();

    assert_eq!(SqliteDepartmentRepository::new(&conn).count().unwrap(), 1);
}

#[test]
fn failed_joined_call_leaves_outer_transaction_usable() {
    let conn = open_db_in_memory().unwrap();

    let tx = begin(&conn).unwrap();
    let repo = SqliteDepartmentRepository::new(&tx);
    repo.save(Department::new("Sales", None, None)).unwrap();
    let err = repo.save(Department::new("Sales", None, None)).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    repo.save(Department::new("Support", None, None)).unwrap();
    tx.commit().unwrap();

    assert_eq!(SqliteDepartmentRepository::new(&conn).count().unwrap(), 2);
}

#[test]
fn failed_unit_of_work_rolls_back_every_write_in_it() {
    let conn = open_db_in_memory().unwrap();

    let result = in_transaction(&conn, "test.batch", |conn| {
        let departments = SqliteDepartmentRepository::new(conn);
        let employees = SqliteEmployeeRepository::new(conn);
        departments.save(Department::new("Sales", None, None))?;
        employees.save(Employee::new("Ana", "Martínez", Some("ana@example.com".into())))?;
        employees.save(Employee::new("Ana", "Copy", Some("ana@example.com".into())))?;
        Ok(())
    });

    match result {
        Err(RepoError::Constraint(violation)) => {
            assert_eq!(violation.kind, ConstraintKind::Unique);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(conn.is_autocommit());
    assert_eq!(SqliteDepartmentRepository::new(&conn).count().unwrap(), 0);
    assert!(SqliteEmployeeRepository::new(&conn)
        .find_all()
        .unwrap()
        .is_empty());
}
