//! Entity model for the bookstore and company domains.
//!
//! # Responsibility
//! - Define plain records with explicit relationship fields.
//! - Provide helpers that update both sides of an association in one call.
//!
//! # Invariants
//! - Entities carry `id: None` until persisted.
//! - "Many" sides hold identities, never live references to other records.
//! - Relationship collections reflect only what one read loaded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bookstore;
pub mod company;

/// Relationship helper called with an entity that has no identity yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkError {
    pub entity: &'static str,
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} must be saved before it can be linked", self.entity)
    }
}

impl Error for LinkError {}

pub(crate) fn require_id<T: Copy>(id: Option<T>, entity: &'static str) -> Result<T, LinkError> {
    id.ok_or(LinkError { entity })
}

/// A root entity together with the related rows an eager read loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct WithMany<R, C> {
    pub root: R,
    pub related: Vec<C>,
}

impl<R, C> WithMany<R, C> {
    pub fn new(root: R) -> Self {
        Self {
            root,
            related: Vec::new(),
        }
    }
}

/// A root entity together with its optional single related row.
#[derive(Debug, Clone, PartialEq)]
pub struct WithOne<R, T> {
    pub root: R,
    pub related: Option<T>,
}
