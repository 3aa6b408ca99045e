//! Company org chart records.
//!
//! # Invariants
//! - An employee owns at most one address; the address points back to it.
//! - An employee belongs to at most one department.
//! - `Employee::projects` and `Project::employees` mirror the same join rows.

use super::{require_id, LinkError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type DepartmentId = i64;
pub type AddressId = i64;
pub type EmployeeId = i64;
pub type ProjectId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Option<DepartmentId>,
    /// Unique across departments.
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Filled by `find_all_with_employees`; empty otherwise.
    #[serde(default)]
    pub employees: Vec<EmployeeId>,
}

impl Department {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            location,
            employees: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Option<AddressId>,
    pub street: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    /// Derived from `employees.address_id`; never written through the address.
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: Option<String>,
        country: Option<String>,
    ) -> Self {
        Self {
            id: None,
            street: street.into(),
            city: city.into(),
            postal_code,
            country,
            employee_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<EmployeeId>,
    pub name: String,
    pub surname: String,
    /// Unique across employees when set.
    pub email: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<f64>,
    pub address_id: Option<AddressId>,
    pub department_id: Option<DepartmentId>,
    /// Filled by `find_all_with_projects`; empty otherwise.
    #[serde(default)]
    pub projects: BTreeSet<ProjectId>,
}

impl Employee {
    pub fn new(name: impl Into<String>, surname: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            surname: surname.into(),
            email,
            hire_date: None,
            salary: None,
            address_id: None,
            department_id: None,
            projects: BTreeSet::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Makes `address` this employee's address and sets its back-reference.
    pub fn assign_address(&mut self, address: &mut Address) -> Result<(), LinkError> {
        let employee_id = require_id(self.id, "employee")?;
        let address_id = require_id(address.id, "address")?;
        self.address_id = Some(address_id);
        address.employee_id = Some(employee_id);
        Ok(())
    }

    /// Moves this employee into `department` and lists it there once.
    pub fn assign_department(&mut self, department: &mut Department) -> Result<(), LinkError> {
        let employee_id = require_id(self.id, "employee")?;
        let department_id = require_id(department.id, "department")?;
        self.department_id = Some(department_id);
        if !department.employees.contains(&employee_id) {
            department.employees.push(employee_id);
        }
        Ok(())
    }

    /// Leaves `department` if this employee belongs to it. Returns whether it did.
    pub fn leave_department(&mut self, department: &mut Department) -> bool {
        if let Some(employee_id) = self.id {
            department.employees.retain(|id| *id != employee_id);
        }
        let member = department.id.is_some() && self.department_id == department.id;
        if member {
            self.department_id = None;
        }
        member
    }

    /// Records the assignment on both sides. Returns `false` if it already existed.
    pub fn assign_project(&mut self, project: &mut Project) -> Result<bool, LinkError> {
        let employee_id = require_id(self.id, "employee")?;
        let project_id = require_id(project.id, "project")?;
        let added = self.projects.insert(project_id);
        project.employees.insert(employee_id);
        Ok(added)
    }

    /// Drops the assignment on both sides. Returns whether this side listed it.
    pub fn leave_project(&mut self, project: &mut Project) -> bool {
        if let Some(employee_id) = self.id {
            project.employees.remove(&employee_id);
        }
        project
            .id
            .is_some_and(|project_id| self.projects.remove(&project_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<ProjectId>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    /// Filled by `find_all_with_employees`; empty otherwise.
    #[serde(default)]
    pub employees: BTreeSet<EmployeeId>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            start_date: None,
            end_date: None,
            budget: None,
            employees: BTreeSet::new(),
        }
    }
}
