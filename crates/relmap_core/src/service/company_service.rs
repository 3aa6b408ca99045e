//! Company org chart use cases: seeding, bulk deletion and the three
//! relationship reports (one-to-one, one-to-many, many-to-many).

use super::sample_data::{ADDRESSES, DEPARTMENTS, EMPLOYEES, PROJECTS};
use super::{
    delete_each, or_dash, sample_date, DeleteSummary, Report, SeedOutcome, ServiceError,
    ServiceResult,
};
use crate::model::company::{Address, Department, Employee, Project};
use crate::repo::address_repo::{AddressRepository, SqliteAddressRepository};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::tx::within;
use chrono::{Local, Months, NaiveDate};
use log::info;
use rusqlite::Connection;
use std::time::Instant;

pub struct CompanyService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CompanyService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Seeds departments, projects, addresses and employees with all their
    /// links, dating projects from today. Skipped when any department exists.
    pub fn create_sample_data(&self) -> ServiceResult<SeedOutcome> {
        self.create_sample_data_as_of(Local::now().date_naive())
    }

    /// Same as [`Self::create_sample_data`] with an explicit reference day.
    pub fn create_sample_data_as_of(&self, today: NaiveDate) -> ServiceResult<SeedOutcome> {
        let started_at = Instant::now();
        let outcome = within(self.conn, "company.seed", |conn: &Connection| {
            seed(conn, today)
        })?;
        info!(
            "event=seed module=service domain=company status=ok outcome={:?} duration_ms={}",
            outcome,
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }

    /// Deletes the whole domain: project assignments first, then employees
    /// (with their addresses), leftover addresses, projects and departments.
    pub fn delete_all_data(&self) -> ServiceResult<DeleteSummary> {
        let started_at = Instant::now();
        let summary = within(
            self.conn,
            "company.delete_all",
            |conn: &Connection| -> ServiceResult<DeleteSummary> {
                let employees = SqliteEmployeeRepository::new(conn);
                let addresses = SqliteAddressRepository::new(conn);
                let projects = SqliteProjectRepository::new(conn);
                let departments = SqliteDepartmentRepository::new(conn);

                let join_rows = employees.clear_project_assignments()?;
                let entities = vec![
                    (
                        "employees",
                        delete_each(employees.find_all()?, |e| e.id, |id| employees.delete(id))?,
                    ),
                    (
                        "addresses",
                        delete_each(addresses.find_all()?, |a| a.id, |id| addresses.delete(id))?,
                    ),
                    (
                        "projects",
                        delete_each(projects.find_all()?, |p| p.id, |id| projects.delete(id))?,
                    ),
                    (
                        "departments",
                        delete_each(
                            departments.find_all()?,
                            |d| d.id,
                            |id| departments.delete(id),
                        )?,
                    ),
                ];
                Ok(DeleteSummary {
                    join_rows,
                    entities,
                })
            },
        )?;
        info!(
            "event=bulk_delete module=service domain=company status=ok join_rows={} duration_ms={}",
            summary.join_rows,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    /// Employee -> address.
    pub fn one_to_one(&self) -> ServiceResult<Report> {
        let employees = SqliteEmployeeRepository::new(self.conn).find_all_with_address()?;
        let mut report = Report::new("One-to-one: employee and address");
        for entry in employees {
            report.line(format!("Employee: {}", entry.root.full_name()));
            match &entry.related {
                Some(address) => report.line(format!(
                    "Address: {}, {}, {}, {}",
                    address.street,
                    address.city,
                    or_dash(address.postal_code.as_deref()),
                    or_dash(address.country.as_deref())
                )),
                None => report.line("  No associated address"),
            }
            report.blank();
        }
        Ok(report.or_empty("No employees stored."))
    }

    /// Department -> employees.
    pub fn one_to_many(&self) -> ServiceResult<Report> {
        let departments =
            SqliteDepartmentRepository::new(self.conn).find_all_with_employees()?;
        let mut report = Report::new("One-to-many: department and employees");
        for entry in departments {
            let department = &entry.root;
            report.line(format!(
                "Department: {} - {} - Location: {}",
                department.name,
                or_dash(department.description.as_deref()),
                or_dash(department.location.as_deref())
            ));
            if entry.related.is_empty() {
                report.line("  No associated employees");
            } else {
                report.line("  Employees:");
                for employee in &entry.related {
                    let hired = employee
                        .hire_date
                        .map_or_else(|| "-".to_string(), |date| date.to_string());
                    report.line(format!("  - {} - Hired: {hired}", employee.full_name()));
                }
            }
            report.blank();
        }
        Ok(report.or_empty("No departments stored."))
    }

    /// Projects -> employees, then employees -> projects.
    pub fn many_to_many(&self) -> ServiceResult<Report> {
        let projects = SqliteProjectRepository::new(self.conn).find_all_with_employees()?;
        let employees = SqliteEmployeeRepository::new(self.conn).find_all_with_projects()?;
        let mut report = Report::new("Many-to-many: projects and employees");

        report.line("--- Projects and their employees ---");
        for entry in &projects {
            let project = &entry.root;
            let budget = project
                .budget
                .map_or_else(|| "-".to_string(), |budget| format!("{budget:.2}"));
            report.line(format!(
                "Project: {} - {} - Budget: {budget}€",
                project.name,
                or_dash(project.description.as_deref())
            ));
            if entry.related.is_empty() {
                report.line("  No assigned employees");
            } else {
                report.line("  Assigned employees:");
                for employee in &entry.related {
                    report.line(format!(
                        "  - {} - {}",
                        employee.full_name(),
                        or_dash(employee.email.as_deref())
                    ));
                }
            }
            report.blank();
        }

        report.line("--- Employees and their projects ---");
        for entry in &employees {
            let employee = &entry.root;
            report.line(format!(
                "Employee: {} - {}",
                employee.full_name(),
                or_dash(employee.email.as_deref())
            ));
            if entry.related.is_empty() {
                report.line("  Not assigned to any project");
            } else {
                report.line("  Assigned projects:");
                for project in &entry.related {
                    report.line(format!(
                        "  - {} - {}",
                        project.name,
                        or_dash(project.description.as_deref())
                    ));
                }
            }
            report.blank();
        }
        Ok(report)
    }
}

fn seed(conn: &Connection, today: NaiveDate) -> ServiceResult<SeedOutcome> {
    let department_repo = SqliteDepartmentRepository::new(conn);
    if department_repo.count()? > 0 {
        return Ok(SeedOutcome::AlreadyExists);
    }
    let project_repo = SqliteProjectRepository::new(conn);
    let address_repo = SqliteAddressRepository::new(conn);
    let employee_repo = SqliteEmployeeRepository::new(conn);

    let mut departments = Vec::with_capacity(DEPARTMENTS.len());
    for seed in DEPARTMENTS {
        departments.push(department_repo.save(Department::new(
            seed.name,
            Some(seed.description.to_string()),
            Some(seed.location.to_string()),
        ))?);
    }

    let mut projects = Vec::with_capacity(PROJECTS.len());
    for seed in PROJECTS {
        let mut project = Project::new(seed.name, Some(seed.description.to_string()));
        let start = today
            .checked_sub_months(Months::new(seed.started_months_ago))
            .ok_or(ServiceError::InconsistentState("project start out of range"))?;
        let end = today
            .checked_add_months(Months::new(seed.ends_in_months))
            .ok_or(ServiceError::InconsistentState("project end out of range"))?;
        project.start_date = Some(start);
        project.end_date = Some(end);
        project.budget = Some(seed.budget);
        projects.push(project_repo.save(project)?);
    }

    let mut addresses = Vec::with_capacity(ADDRESSES.len());
    for seed in ADDRESSES {
        addresses.push(address_repo.save(Address::new(
            seed.street,
            seed.city,
            Some(seed.postal_code.to_string()),
            Some(seed.country.to_string()),
        ))?);
    }

    for seed in EMPLOYEES {
        let mut employee = Employee::new(seed.name, seed.surname, Some(seed.email.to_string()));
        employee.hire_date = Some(sample_date(seed.hired)?);
        employee.salary = Some(seed.salary);
        let mut employee = employee_repo.save(employee)?;

        let address = addresses
            .get_mut(seed.address)
            .ok_or(ServiceError::InconsistentState("sample address index out of range"))?;
        employee_repo.assign_address(&mut employee, address)?;

        let department = departments
            .get_mut(seed.department)
            .ok_or(ServiceError::InconsistentState("sample department index out of range"))?;
        employee_repo.assign_department(&mut employee, department)?;

        for &index in seed.projects {
            let project = projects
                .get_mut(index)
                .ok_or(ServiceError::InconsistentState("sample project index out of range"))?;
            employee_repo.assign_project(&mut employee, project)?;
        }
    }

    Ok(SeedOutcome::Created)
}
