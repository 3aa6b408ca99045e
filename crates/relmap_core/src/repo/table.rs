//! Row mapping shared by the entity repositories.
//!
//! Entities map to one table each with an `id INTEGER PRIMARY KEY` column
//! followed by `COLUMNS`. Rows are read positionally so joined queries can
//! decode several entities from one row by offset.

use super::{RepoError, RepoResult};
use crate::model::{WithMany, WithOne};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

pub(crate) trait Table: Sized {
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Non-key columns, in `values()` order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
    fn values(&self) -> Vec<Value>;
    /// Decodes `id` at `offset` followed by `COLUMNS`.
    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self>;

    fn width() -> usize {
        Self::COLUMNS.len() + 1
    }

    fn select_list(alias: &str) -> String {
        std::iter::once("id")
            .chain(Self::COLUMNS.iter().copied())
            .map(|column| format!("{alias}.{column}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn insert<T: Table>(conn: &Connection, entity: &mut T) -> RepoResult<()> {
    let placeholders = (1..=T::COLUMNS.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        T::TABLE,
        T::COLUMNS.join(", ")
    );
    conn.execute(&sql, params_from_iter(entity.values()))?;
    entity.set_id(conn.last_insert_rowid());
    Ok(())
}

pub(crate) fn update<T: Table>(conn: &Connection, entity: &T) -> RepoResult<()> {
    let id = entity.id().ok_or(RepoError::Unsaved { entity: T::ENTITY })?;
    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{};",
        T::TABLE,
        T::COLUMNS.len() + 1
    );

    let mut values = entity.values();
    values.push(Value::Integer(id));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: T::ENTITY,
            id,
        });
    }
    Ok(())
}

pub(crate) fn find_by_id<T: Table>(conn: &Connection, id: i64) -> RepoResult<Option<T>> {
    let sql = format!(
        "SELECT {} FROM {} t WHERE t.id = ?1;",
        T::select_list("t"),
        T::TABLE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(T::from_row(row, 0)?)),
        None => Ok(None),
    }
}

pub(crate) fn find_all<T: Table>(conn: &Connection) -> RepoResult<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} t ORDER BY t.id ASC;",
        T::select_list("t"),
        T::TABLE
    );
    query_list(conn, &sql)
}

/// Decodes every row of `sql` as one `T` starting at column 0.
pub(crate) fn query_list<T: Table>(conn: &Connection, sql: &str) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut entities = Vec::new();
    while let Some(row) = rows.next()? {
        entities.push(T::from_row(row, 0)?);
    }
    Ok(entities)
}

/// Deletes by id. Returns whether a row was removed.
pub(crate) fn delete_by_id<T: Table>(conn: &Connection, id: i64) -> RepoResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1;", T::TABLE);
    Ok(conn.execute(&sql, [id])? > 0)
}

pub(crate) fn count<T: Table>(conn: &Connection) -> RepoResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {};", T::TABLE);
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Fails with `NotFound` unless a row with `id` exists.
pub(crate) fn ensure_exists<T: Table>(conn: &Connection, id: i64) -> RepoResult<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1;", T::TABLE);
    let found = conn
        .query_row(&sql, [id], |_| Ok(()))
        .optional()?
        .is_some();
    if !found {
        return Err(RepoError::NotFound {
            entity: T::ENTITY,
            id,
        });
    }
    Ok(())
}

/// Folds root-LEFT-JOIN-child rows into one entry per distinct root.
///
/// `sql` must select `R` then `C` and order by the root id first. `link`
/// runs once per loaded child to record the pairing on both sides.
pub(crate) fn query_with_many<R, C, F>(
    conn: &Connection,
    sql: &str,
    mut link: F,
) -> RepoResult<Vec<WithMany<R, C>>>
where
    R: Table,
    C: Table,
    F: FnMut(&mut R, &mut C) -> RepoResult<()>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut loaded: Vec<WithMany<R, C>> = Vec::new();

    while let Some(row) = rows.next()? {
        let root_id: i64 = row.get(0)?;
        let is_new_root = loaded
            .last()
            .map_or(true, |entry| entry.root.id() != Some(root_id));
        if is_new_root {
            loaded.push(WithMany::new(R::from_row(row, 0)?));
        }

        let child_id: Option<i64> = row.get(R::width())?;
        if child_id.is_none() {
            continue;
        }
        let mut child = C::from_row(row, R::width())?;
        if let Some(entry) = loaded.last_mut() {
            link(&mut entry.root, &mut child)?;
            entry.related.push(child);
        }
    }

    Ok(loaded)
}

/// Decodes root-LEFT-JOIN-single rows; `link` runs when the join matched.
pub(crate) fn query_with_one<R, T, F>(
    conn: &Connection,
    sql: &str,
    mut link: F,
) -> RepoResult<Vec<WithOne<R, T>>>
where
    R: Table,
    T: Table,
    F: FnMut(&mut R, &mut T) -> RepoResult<()>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut loaded = Vec::new();

    while let Some(row) = rows.next()? {
        let mut root = R::from_row(row, 0)?;
        let related_id: Option<i64> = row.get(R::width())?;
        let related = match related_id {
            Some(_) => {
                let mut related = T::from_row(row, R::width())?;
                link(&mut root, &mut related)?;
                Some(related)
            }
            None => None,
        };
        loaded.push(WithOne { root, related });
    }

    Ok(loaded)
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

pub(crate) fn opt_id(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

pub(crate) fn opt_real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

pub(crate) fn opt_date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, |date| {
        Value::Text(date.format("%Y-%m-%d").to_string())
    })
}
