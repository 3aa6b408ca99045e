use chrono::NaiveDate;
use relmap_core::db::open_db_in_memory;
use relmap_core::model::company::{Address, Department, Employee, Project};
use relmap_core::repo::address_repo::{AddressRepository, SqliteAddressRepository};
use relmap_core::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use relmap_core::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use relmap_core::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use relmap_core::{ConstraintKind, RepoError};
use rusqlite::Connection;

#[test]
fn employee_roundtrip_keeps_every_column() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let mut employee = Employee::new("Juan", "Pérez", Some("juan.perez@example.com".into()));
    employee.hire_date = NaiveDate::from_ymd_opt(2020, 1, 15);
    employee.salary = Some(35_000.0);
    let saved = repo.save(employee).unwrap();

    assert_eq!(repo.find_by_id(saved.id.unwrap()).unwrap(), Some(saved));
}

#[test]
fn department_save_then_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDepartmentRepository::new(&conn);

    let saved = repo
        .save(Department::new(
            "Tecnología",
            Some("Departamento de Tecnología e Innovación".into()),
            Some("Planta 3".into()),
        ))
        .unwrap();
    let bare = repo.save(Department::new("RRHH", None, None)).unwrap();

    assert_eq!(repo.find_by_id(saved.id.unwrap()).unwrap(), Some(saved));
    assert_eq!(repo.find_by_id(bare.id.unwrap()).unwrap(), Some(bare));
}

#[test]
fn address_roundtrip_with_and_without_owner() {
    let conn = open_db_in_memory().unwrap();
    let addresses = SqliteAddressRepository::new(&conn);

    let unowned = addresses.save(sample_address("Gran Vía 2")).unwrap();
    assert_eq!(unowned.employee_id, None);
    assert_eq!(
        addresses.find_by_id(unowned.id.unwrap()).unwrap(),
        Some(unowned)
    );

    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let mut owned = addresses
        .save(Address::new("Calle Mayor 10", "Madrid", None, None))
        .unwrap();
    SqliteEmployeeRepository::new(&conn)
        .assign_address(&mut juan, &mut owned)
        .unwrap();
    assert_eq!(owned.employee_id, juan.id);
    assert_eq!(
        addresses.find_by_id(owned.id.unwrap()).unwrap(),
        Some(owned)
    );
}

#[test]
fn duplicate_department_name_is_a_unique_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDepartmentRepository::new(&conn);

    repo.save(Department::new("Sales", None, None)).unwrap();
    let err = repo.save(Department::new("Sales", None, None)).unwrap_err();

    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn duplicate_email_is_a_unique_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    repo.save(Employee::new("Ana", "Martínez", Some("ana@example.com".into())))
        .unwrap();
    let err = repo
        .save(Employee::new("Ana", "Other", Some("ana@example.com".into())))
        .unwrap_err();

    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    // NULL emails never collide.
    repo.save(Employee::new("No", "Mail", None)).unwrap();
    repo.save(Employee::new("Also", "Nomail", None)).unwrap();
}

#[test]
fn assign_address_links_both_sides_and_is_one_to_one() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let addresses = SqliteAddressRepository::new(&conn);

    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let mut maria = save_employee(&conn, "María", "maria@example.com");
    let mut home = addresses.save(sample_address("Calle Mayor 1")).unwrap();

    employees.assign_address(&mut juan, &mut home).unwrap();
    assert_eq!(juan.address_id, home.id);
    assert_eq!(home.employee_id, juan.id);

    let stored = addresses.find_by_id(home.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.employee_id, juan.id);

    let err = employees.assign_address(&mut maria, &mut home).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

    let loaded = employees.find_all_with_address().unwrap();
    assert_eq!(loaded[0].related.as_ref().map(|a| a.id), Some(home.id));
    assert!(loaded[1].related.is_none());
}

#[test]
fn deleting_employee_removes_owned_address() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let addresses = SqliteAddressRepository::new(&conn);

    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let mut home = addresses.save(sample_address("Calle Mayor 1")).unwrap();
    let spare = addresses.save(sample_address("Gran Vía 2")).unwrap();
    employees.assign_address(&mut juan, &mut home).unwrap();

    employees.delete(juan.id.unwrap()).unwrap();
    employees.delete(juan.id.unwrap()).unwrap();

    assert!(addresses.find_by_id(home.id.unwrap()).unwrap().is_none());
    let remaining = addresses.find_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, spare.id);
    assert_eq!(remaining[0].employee_id, None);
}

#[test]
fn assigned_address_cannot_be_deleted_directly() {
    let conn = open_db_in_memory().unwrap();
    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let addresses = SqliteAddressRepository::new(&conn);
    let mut home = addresses.save(sample_address("Calle Mayor 1")).unwrap();
    SqliteEmployeeRepository::new(&conn)
        .assign_address(&mut juan, &mut home)
        .unwrap();

    let err = addresses.delete(home.id.unwrap()).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
}

#[test]
fn department_membership_follows_assign_and_leave() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let departments = SqliteDepartmentRepository::new(&conn);

    let mut sales = departments
        .save(Department::new("Sales", Some("Direct sales".into()), None))
        .unwrap();
    let mut support = departments
        .save(Department::new("Support", None, None))
        .unwrap();
    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let mut maria = save_employee(&conn, "María", "maria@example.com");

    employees.assign_department(&mut juan, &mut sales).unwrap();
    employees.assign_department(&mut maria, &mut sales).unwrap();
    assert_eq!(sales.employees, vec![juan.id.unwrap(), maria.id.unwrap()]);

    let loaded = departments.find_all_with_employees().unwrap();
    assert_eq!(loaded[0].related.len(), 2);
    assert!(loaded[1].related.is_empty());

    assert!(!employees.leave_department(&mut juan, &mut support).unwrap());
    assert!(employees.leave_department(&mut juan, &mut sales).unwrap());
    assert_eq!(juan.department_id, None);
    assert_eq!(sales.employees, vec![maria.id.unwrap()]);

    let loaded = employees.find_all_with_department().unwrap();
    assert!(loaded[0].related.is_none());
    assert_eq!(loaded[1].related.as_ref().map(|d| d.id), Some(sales.id));
}

#[test]
fn assign_department_reports_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let mut juan = save_employee(&conn, "Juan", "juan@example.com");

    let mut ghost = Department::new("Ghost", None, None);
    assert!(matches!(
        employees.assign_department(&mut juan, &mut ghost),
        Err(RepoError::Unsaved { .. })
    ));

    ghost.id = Some(77);
    assert!(matches!(
        employees.assign_department(&mut juan, &mut ghost),
        Err(RepoError::NotFound { id: 77, .. })
    ));
    assert_eq!(juan.department_id, None);
}

#[test]
fn project_assignment_is_many_to_many_without_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let projects = SqliteProjectRepository::new(&conn);

    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let mut ana = save_employee(&conn, "Ana", "ana@example.com");
    let mut erp = projects
        .save(Project::new("ERP", Some("Back office".into())))
        .unwrap();
    let mut web = projects.save(Project::new("Web", None)).unwrap();

    assert!(employees.assign_project(&mut juan, &mut erp).unwrap());
    assert!(!employees.assign_project(&mut juan, &mut erp).unwrap());
    employees.assign_project(&mut juan, &mut web).unwrap();
    employees.assign_project(&mut ana, &mut erp).unwrap();
    assert_eq!(assignment_rows(&conn), 3);

    let by_project = projects.find_all_with_employees().unwrap();
    assert_eq!(by_project[0].related.len(), 2);
    assert_eq!(by_project[1].related.len(), 1);

    let by_employee = employees.find_all_with_projects().unwrap();
    assert_eq!(by_employee[0].related.len(), 2);
    assert!(by_employee[0]
        .root
        .projects
        .contains(&web.id.unwrap()));
    assert_eq!(by_employee[1].related[0].id, erp.id);

    assert!(employees.leave_project(&mut juan, &mut erp).unwrap());
    assert!(!employees.leave_project(&mut juan, &mut erp).unwrap());
    assert!(!juan.projects.contains(&erp.id.unwrap()));
    assert!(!erp.employees.contains(&juan.id.unwrap()));
    assert_eq!(assignment_rows(&conn), 2);
}

#[test]
fn assigned_project_cannot_be_deleted_before_clearing_assignments() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let projects = SqliteProjectRepository::new(&conn);
    let mut juan = save_employee(&conn, "Juan", "juan@example.com");
    let mut erp = projects.save(Project::new("ERP", None)).unwrap();
    employees.assign_project(&mut juan, &mut erp).unwrap();

    let err = projects.delete(erp.id.unwrap()).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));

    assert_eq!(employees.clear_project_assignments().unwrap(), 1);
    projects.delete(erp.id.unwrap()).unwrap();
    assert!(projects.find_all().unwrap().is_empty());
}

#[test]
fn project_dates_and_budget_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let mut project = Project::new("Migration", Some("Move to the cloud".into()));
    project.start_date = NaiveDate::from_ymd_opt(2024, 2, 29);
    project.end_date = NaiveDate::from_ymd_opt(2025, 1, 31);
    project.budget = Some(150_000.5);
    let saved = repo.save(project).unwrap();

    let mut loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, saved);
    loaded.budget = None;
    let updated = repo.update(loaded).unwrap();
    assert_eq!(
        repo.find_by_id(updated.id.unwrap()).unwrap().unwrap().budget,
        None
    );
}

fn save_employee(conn: &Connection, name: &str, email: &str) -> Employee {
    SqliteEmployeeRepository::new(conn)
        .save(Employee::new(name, "Test", Some(email.to_string())))
        .unwrap()
}

fn sample_address(street: &str) -> Address {
    Address::new(street, "Madrid", Some("28001".into()), Some("España".into()))
}

fn assignment_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM employee_projects;", [], |row| row.get(0))
        .unwrap()
}
