//! Employee repository: employees, their address and department links and
//! their project assignments (the `employee_projects` join table).
//!
//! # Invariants
//! - An address is owned by at most one employee (`address_id` is unique).
//! - Deleting an employee deletes the address it owns in the same transaction.
//! - An employee/project pair has at most one join row.

use super::table::{self, opt_date, opt_id, opt_real, opt_text, text, Table};
use super::tx::in_transaction;
use super::{RepoError, RepoResult};
use crate::model::company::{Address, Department, Employee, EmployeeId, Project};
use crate::model::{WithMany, WithOne};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

const ASSIGNMENT_TABLE: &str = "employee_projects";

impl Table for Employee {
    const ENTITY: &'static str = "employee";
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "surname",
        "email",
        "hire_date",
        "salary",
        "address_id",
        "department_id",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.surname),
            opt_text(self.email.as_deref()),
            opt_date(self.hire_date),
            opt_real(self.salary),
            opt_id(self.address_id),
            opt_id(self.department_id),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            surname: row.get(offset + 2)?,
            email: row.get(offset + 3)?,
            hire_date: row.get(offset + 4)?,
            salary: row.get(offset + 5)?,
            address_id: row.get(offset + 6)?,
            department_id: row.get(offset + 7)?,
            projects: BTreeSet::new(),
        })
    }
}

pub trait EmployeeRepository {
    /// Fails with a unique constraint violation on a duplicate email or an
    /// address already owned by someone else.
    fn save(&self, employee: Employee) -> RepoResult<Employee>;
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn find_all(&self) -> RepoResult<Vec<Employee>>;
    fn find_all_with_department(&self) -> RepoResult<Vec<WithOne<Employee, Department>>>;
    fn find_all_with_address(&self) -> RepoResult<Vec<WithOne<Employee, Address>>>;
    fn find_all_with_projects(&self) -> RepoResult<Vec<WithMany<Employee, Project>>>;
    fn update(&self, employee: Employee) -> RepoResult<Employee>;
    /// Deletes the employee and the address it owns.
    fn delete(&self, id: EmployeeId) -> RepoResult<()>;

    /// Returns `false` when the assignment already existed; no row is added.
    fn assign_project(&self, employee: &mut Employee, project: &mut Project) -> RepoResult<bool>;
    /// Returns whether an assignment row went away.
    fn leave_project(&self, employee: &mut Employee, project: &mut Project) -> RepoResult<bool>;
    fn assign_department(
        &self,
        employee: &mut Employee,
        department: &mut Department,
    ) -> RepoResult<()>;
    /// Clears the department link if it points at `department`.
    fn leave_department(
        &self,
        employee: &mut Employee,
        department: &mut Department,
    ) -> RepoResult<bool>;
    fn assign_address(&self, employee: &mut Employee, address: &mut Address) -> RepoResult<()>;
    /// Deletes every assignment row with one statement. Returns the number removed.
    fn clear_project_assignments(&self) -> RepoResult<usize>;
}

pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn save(&self, mut employee: Employee) -> RepoResult<Employee> {
        in_transaction(self.conn, "employee.save", |conn| {
            table::insert(conn, &mut employee)?;
            Ok(employee)
        })
    }

    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        in_transaction(self.conn, "employee.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Employee>> {
        in_transaction(self.conn, "employee.find_all", table::find_all::<Employee>)
    }

    fn find_all_with_department(&self) -> RepoResult<Vec<WithOne<Employee, Department>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM employees e
             LEFT JOIN departments d ON d.id = e.department_id
             ORDER BY e.id ASC;",
            Employee::select_list("e"),
            Department::select_list("d"),
        );
        in_transaction(self.conn, "employee.find_all_with_department", |conn| {
            table::query_with_one(
                conn,
                &sql,
                |employee: &mut Employee, department: &mut Department| {
                    Ok(employee.assign_department(department)?)
                },
            )
        })
    }

    fn find_all_with_address(&self) -> RepoResult<Vec<WithOne<Employee, Address>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM employees e
             LEFT JOIN addresses a ON a.id = e.address_id
             ORDER BY e.id ASC;",
            Employee::select_list("e"),
            Address::select_list("a"),
        );
        in_transaction(self.conn, "employee.find_all_with_address", |conn| {
            table::query_with_one(conn, &sql, |employee: &mut Employee, address: &mut Address| {
                Ok(employee.assign_address(address)?)
            })
        })
    }

    fn find_all_with_projects(&self) -> RepoResult<Vec<WithMany<Employee, Project>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM employees e
             LEFT JOIN {ASSIGNMENT_TABLE} ep ON ep.employee_id = e.id
             LEFT JOIN projects p ON p.id = ep.project_id
             ORDER BY e.id ASC, p.id ASC;",
            Employee::select_list("e"),
            Project::select_list("p"),
        );
        in_transaction(self.conn, "employee.find_all_with_projects", |conn| {
            table::query_with_many(conn, &sql, |employee: &mut Employee, project: &mut Project| {
                employee.assign_project(project)?;
                Ok(())
            })
        })
    }

    fn update(&self, employee: Employee) -> RepoResult<Employee> {
        in_transaction(self.conn, "employee.update", |conn| {
            table::update(conn, &employee)?;
            Ok(employee)
        })
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<()> {
        in_transaction(self.conn, "employee.delete", |conn| {
            let owned_address: Option<Option<i64>> = conn
                .query_row(
                    "SELECT address_id FROM employees WHERE id = ?1;",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(owned_address) = owned_address else {
                return Ok(());
            };

            table::delete_by_id::<Employee>(conn, id)?;
            if let Some(address_id) = owned_address {
                table::delete_by_id::<Address>(conn, address_id)?;
            }
            Ok(())
        })
    }

    fn assign_project(&self, employee: &mut Employee, project: &mut Project) -> RepoResult<bool> {
        let employee_id = saved_id(employee.id, Employee::ENTITY)?;
        let project_id = saved_id(project.id, Project::ENTITY)?;
        let inserted = in_transaction(self.conn, "employee.assign_project", |conn| {
            table::ensure_exists::<Employee>(conn, employee_id)?;
            table::ensure_exists::<Project>(conn, project_id)?;
            let changed = conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO {ASSIGNMENT_TABLE} (employee_id, project_id)
                     VALUES (?1, ?2);"
                ),
                params![employee_id, project_id],
            )?;
            Ok(changed > 0)
        })?;

        employee.assign_project(project)?;
        Ok(inserted)
    }

    fn leave_project(&self, employee: &mut Employee, project: &mut Project) -> RepoResult<bool> {
        let employee_id = saved_id(employee.id, Employee::ENTITY)?;
        let project_id = saved_id(project.id, Project::ENTITY)?;
        let removed = in_transaction(self.conn, "employee.leave_project", |conn| {
            let changed = conn.execute(
                &format!(
                    "DELETE FROM {ASSIGNMENT_TABLE} WHERE employee_id = ?1 AND project_id = ?2;"
                ),
                params![employee_id, project_id],
            )?;
            Ok(changed > 0)
        })?;

        employee.leave_project(project);
        Ok(removed)
    }

    fn assign_department(
        &self,
        employee: &mut Employee,
        department: &mut Department,
    ) -> RepoResult<()> {
        let employee_id = saved_id(employee.id, Employee::ENTITY)?;
        let department_id = saved_id(department.id, Department::ENTITY)?;
        in_transaction(self.conn, "employee.assign_department", |conn| {
            table::ensure_exists::<Department>(conn, department_id)?;
            let changed = conn.execute(
                "UPDATE employees SET department_id = ?1 WHERE id = ?2;",
                params![department_id, employee_id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: Employee::ENTITY,
                    id: employee_id,
                });
            }
            Ok(())
        })?;

        employee.assign_department(department)?;
        Ok(())
    }

    fn leave_department(
        &self,
        employee: &mut Employee,
        department: &mut Department,
    ) -> RepoResult<bool> {
        let employee_id = saved_id(employee.id, Employee::ENTITY)?;
        let department_id = saved_id(department.id, Department::ENTITY)?;
        let left = in_transaction(self.conn, "employee.leave_department", |conn| {
            let changed = conn.execute(
                "UPDATE employees SET department_id = NULL
                 WHERE id = ?1 AND department_id = ?2;",
                params![employee_id, department_id],
            )?;
            Ok(changed > 0)
        })?;

        employee.leave_department(department);
        Ok(left)
    }

    fn assign_address(&self, employee: &mut Employee, address: &mut Address) -> RepoResult<()> {
        let employee_id = saved_id(employee.id, Employee::ENTITY)?;
        let address_id = saved_id(address.id, Address::ENTITY)?;
        in_transaction(self.conn, "employee.assign_address", |conn| {
            table::ensure_exists::<Address>(conn, address_id)?;
            let changed = conn.execute(
                "UPDATE employees SET address_id = ?1 WHERE id = ?2;",
                params![address_id, employee_id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: Employee::ENTITY,
                    id: employee_id,
                });
            }
            Ok(())
        })?;

        employee.assign_address(address)?;
        Ok(())
    }

    fn clear_project_assignments(&self) -> RepoResult<usize> {
        // Bypasses entity-level checks; keep ASSIGNMENT_TABLE in sync with the schema.
        let removed = in_transaction(self.conn, "employee.clear_project_assignments", |conn| {
            Ok(conn.execute(&format!("DELETE FROM {ASSIGNMENT_TABLE};"), [])?)
        })?;
        info!("event=join_clear module=repo table={ASSIGNMENT_TABLE} rows={removed}");
        Ok(removed)
    }
}

fn saved_id(id: Option<i64>, entity: &'static str) -> RepoResult<i64> {
    id.ok_or(RepoError::Unsaved { entity })
}
