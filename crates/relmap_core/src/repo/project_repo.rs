//! Project repository contract and SQLite implementation.

use super::table::{self, opt_date, opt_real, opt_text, text, Table};
use super::tx::in_transaction;
use super::RepoResult;
use crate::model::company::{Employee, Project, ProjectId};
use crate::model::WithMany;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::collections::BTreeSet;

impl Table for Project {
    const ENTITY: &'static str = "project";
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "start_date", "end_date", "budget"];

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
            opt_date(self.start_date),
            opt_date(self.end_date),
            opt_real(self.budget),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            start_date: row.get(offset + 3)?,
            end_date: row.get(offset + 4)?,
            budget: row.get(offset + 5)?,
            employees: BTreeSet::new(),
        })
    }
}

pub trait ProjectRepository {
    fn save(&self, project: Project) -> RepoResult<Project>;
    fn find_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn find_all(&self) -> RepoResult<Vec<Project>>;
    /// Every project with its assigned employees.
    fn find_all_with_employees(&self) -> RepoResult<Vec<WithMany<Project, Employee>>>;
    fn update(&self, project: Project) -> RepoResult<Project>;
    fn delete(&self, id: ProjectId) -> RepoResult<()>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn save(&self, mut project: Project) -> RepoResult<Project> {
        in_transaction(self.conn, "project.save", |conn| {
            table::insert(conn, &mut project)?;
            Ok(project)
        })
    }

    fn find_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        in_transaction(self.conn, "project.find_by_id", |conn| {
            table::find_by_id(conn, id)
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Project>> {
        in_transaction(self.conn, "project.find_all", table::find_all::<Project>)
    }

    fn find_all_with_employees(&self) -> RepoResult<Vec<WithMany<Project, Employee>>> {
        let sql = format!(
            "SELECT {}, {}
             FROM projects p
             LEFT JOIN employee_projects ep ON ep.project_id = p.id
             LEFT JOIN employees e ON e.id = ep.employee_id
             ORDER BY p.id ASC, e.id ASC;",
            Project::select_list("p"),
            Employee::select_list("e"),
        );
        in_transaction(self.conn, "project.find_all_with_employees", |conn| {
            table::query_with_many(conn, &sql, |project: &mut Project, employee: &mut Employee| {
                employee.assign_project(project)?;
                Ok(())
            })
        })
    }

    fn update(&self, project: Project) -> RepoResult<Project> {
        in_transaction(self.conn, "project.update", |conn| {
            table::update(conn, &project)?;
            Ok(project)
        })
    }

    fn delete(&self, id: ProjectId) -> RepoResult<()> {
        in_transaction(self.conn, "project.delete", |conn| {
            table::delete_by_id::<Project>(conn, id)?;
            Ok(())
        })
    }
}
