//! Department repository contract and SQLite implementation.

use super::table::{self, opt_text, text, Table};
use super::tx::in_transaction;
use super::RepoResult;
use crate::model::company::{Department, DepartmentId, Employee};
use crate::model::WithMany;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

impl Table for Department {
    const ENTITY: &'static str = "department";
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] = &["name", "description", "location"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            opt_text(self.description.as_deref()),
            opt_text(self.location.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            location: row.get(offset + 3)?,
            employees: Vec::new(),
        })
    }
}

pub trait DepartmentRepository {
    /// Fails with a unique constraint violation on a duplicate name.
    fn save(&self, department: Department) -> RepoResult<Department>;
    fn find_by_id(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn find_all(&self) -> RepoResult<Vec<Department>>;
    fn find_all_with_employees(&self) -> RepoResult<Vec<WithMany<Department, Employee>>>;
    fn update(&self, department: Department) -> RepoResult<Department>;
    fn delete(&self, id: DepartmentId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<i64>;
}

pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn save(&self, mut department: Department) -> RepoResult<Department> {
        in_transaction(self.conn, "department.save", |conn| {
            table::insert(conn, &mut department)?;
            Ok(department)
        })
    }

    fn find_by_id(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        in_transaction(self.conn, "department.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Department>> {
        in_transaction(
            self.conn,
            "department.find_all",
            table::find_all::<Department>,
        )
    }

    fn find_all_with_employees(&self) -> RepoResult<Vec<WithMany<Department, Employee>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM departments d
             LEFT JOIN employees e ON e.department_id = d.id
             ORDER BY d.id ASC, e.id ASC;",
            Department::select_list("d"),
            Employee::select_list("e"),
        );
        in_transaction(self.conn, "department.find_all_with_employees", |conn| {
            table::query_with_many(
                conn,
                &sql,
                |department: &mut Department, employee: &mut Employee| {
                    Ok(employee.assign_department(department)?)
                },
            )
        })
    }

    fn update(&self, department: Department) -> RepoResult<Department> {
        in_transaction(self.conn, "department.update", |conn| {
            table::update(conn, &department)?;
            Ok(department)
        })
    }

    fn delete(&self, id: DepartmentId) -> RepoResult<()> {
        in_transaction(self.conn, "department.delete", |conn| {
            table::delete_by_id::<Department>(conn, id)?;
            Ok(())
        })
    }

    fn count(&self) -> RepoResult<i64> {
        in_transaction(self.conn, "department.count", table::count::<Department>)
    }
}
