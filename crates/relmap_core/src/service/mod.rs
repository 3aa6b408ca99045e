//! Domain services for the two sample domains.
//!
//! # Responsibility
//! - Seed and clear each domain in dependency order inside one transaction.
//! - Build read-side reports from eager relationship fetches.
//!
//! # Invariants
//! - Services never print; reports are returned to the caller for display.
//! - A failed seed or bulk delete leaves the database unchanged.

use crate::model::LinkError;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bookstore_service;
pub mod company_service;
mod sample_data;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// Built-in data could not be turned into entities.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(message) => write!(f, "inconsistent state: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<LinkError> for ServiceError {
    fn from(value: LinkError) -> Self {
        Self::Repo(value.into())
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Result of a sample-data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    /// The domain's anchor table already had rows; nothing was written.
    AlreadyExists,
}

impl Display for SeedOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Sample data created."),
            Self::AlreadyExists => {
                write!(f, "Data already exists in the database. Nothing was created.")
            }
        }
    }
}

/// Row counts removed by a bulk delete, in deletion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub join_rows: usize,
    pub entities: Vec<(&'static str, usize)>,
}

impl DeleteSummary {
    pub fn removed(&self, entity: &str) -> usize {
        self.entities
            .iter()
            .find(|(name, _)| *name == entity)
            .map_or(0, |(_, count)| *count)
    }
}

impl Display for DeleteSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Data deleted: {} join rows", self.join_rows)?;
        for (entity, count) in &self.entities {
            write!(f, ", {count} {entity}")?;
        }
        Ok(())
    }
}

/// A titled block of display lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub lines: Vec<String>,
}

impl Report {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Adds `empty` when nothing was written since the title.
    fn or_empty(mut self, empty: &str) -> Self {
        if self.lines.is_empty() {
            self.line(empty);
        }
        self
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== {} =====", self.title)?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Deletes every row in `rows` one by one. Returns how many were deleted.
fn delete_each<T>(
    rows: Vec<T>,
    id: impl Fn(&T) -> Option<i64>,
    mut delete: impl FnMut(i64) -> RepoResult<()>,
) -> RepoResult<usize> {
    let mut deleted = 0;
    for row_id in rows.iter().filter_map(id) {
        delete(row_id)?;
        deleted += 1;
    }
    Ok(deleted)
}

fn pick<T>(items: &mut [T], index: usize) -> ServiceResult<&mut T> {
    items
        .get_mut(index)
        .ok_or(ServiceError::InconsistentState("sample data index out of range"))
}

fn sample_date((year, month, day): (i32, u32, u32)) -> ServiceResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ServiceError::InconsistentState("invalid sample date"))
}
