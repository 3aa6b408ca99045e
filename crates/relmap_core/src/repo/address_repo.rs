//! Address repository contract and SQLite implementation.
//!
//! The owning employee is not an address column; reads derive
//! `Address::employee_id` from `employees.address_id`.

use super::table::{self, opt_text, text, Table};
use super::tx::in_transaction;
use super::RepoResult;
use crate::model::company::{Address, AddressId};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

impl Table for Address {
    const ENTITY: &'static str = "address";
    const TABLE: &'static str = "addresses";
    const COLUMNS: &'static [&'static str] = &["street", "city", "postal_code", "country"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.street),
            text(&self.city),
            opt_text(self.postal_code.as_deref()),
            opt_text(self.country.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>, offset: usize) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get(offset)?),
            street: row.get(offset + 1)?,
            city: row.get(offset + 2)?,
            postal_code: row.get(offset + 3)?,
            country: row.get(offset + 4)?,
            employee_id: None,
        })
    }
}

pub trait AddressRepository {
    fn save(&self, address: Address) -> RepoResult<Address>;
    fn find_by_id(&self, id: AddressId) -> RepoResult<Option<Address>>;
    fn find_all(&self) -> RepoResult<Vec<Address>>;
    fn update(&self, address: Address) -> RepoResult<Address>;
    /// Fails with a foreign-key violation while an employee still owns it.
    fn delete(&self, id: AddressId) -> RepoResult<()>;
}

pub struct SqliteAddressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAddressRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select_with_owner(filter: &str) -> String {
        format!(
            "SELECT {}, e.id
             FROM addresses a
             LEFT JOIN employees e ON e.address_id = a.id
             {filter}
             ORDER BY a.id ASC;",
            Address::select_list("a"),
        )
    }
}

fn address_with_owner(row: &Row<'_>) -> RepoResult<Address> {
    let mut address = Address::from_row(row, 0)?;
    address.employee_id = row.get(Address::width())?;
    Ok(address)
}

impl AddressRepository for SqliteAddressRepository<'_> {
    fn save(&self, mut address: Address) -> RepoResult<Address> {
        in_transaction(self.conn, "address.save", |conn| {
            table::insert(conn, &mut address)?;
            Ok(address)
        })
    }

    fn find_by_id(&self, id: AddressId) -> RepoResult<Option<Address>> {
        let sql = Self::select_with_owner("WHERE a.id = ?1");
        in_transaction(self.conn, "address.find_by_id", |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([id])?;
            match rows.next()? {
                Some(row) => Ok(Some(address_with_owner(row)?)),
                None => Ok(None),
            }
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Address>> {
        let sql = Self::select_with_owner("");
        in_transaction(self.conn, "address.find_all", |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            let mut addresses = Vec::new();
            while let Some(row) = rows.next()? {
                addresses.push(address_with_owner(row)?);
            }
            Ok(addresses)
        })
    }

    fn update(&self, address: Address) -> RepoResult<Address> {
        in_transaction(self.conn, "address.update", |conn| {
            table::update(conn, &address)?;
            Ok(address)
        })
    }

    fn delete(&self, id: AddressId) -> RepoResult<()> {
        in_transaction(self.conn, "address.delete", |conn| {
            table::delete_by_id::<Address>(conn, id)?;
            Ok(())
        })
    }
}
