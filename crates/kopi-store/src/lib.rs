// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! SQLite persistence for the Kopi storefront.
//!
//! A [`Store`] wraps one `rusqlite::Connection`. Every write that touches
//! more than one row (order placement, item recording) runs inside a single
//! transaction so readers never observe an order whose total disagrees with
//! its items.

use chrono::{DateTime, Utc};
use kopi_model::Price;
use rusqlite::Connection;
use std::path::Path;

mod accounts;
mod catalog;
mod error;
mod feedback;
mod orders;
mod schema;

pub use error::StoreError;

pub const CRATE_NAME: &str = "kopi-store";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if needed) the database at `path` and applies the
    /// schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// An isolated in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;",
        )?;
        schema::apply(&conn)?;
        Ok(Self { conn })
    }
}

/// A price column that fails to parse means the database was written by
/// something other than this store.
pub(crate) fn price_from_db(text: &str) -> Result<Price, StoreError> {
    Price::parse(text).map_err(|e| StoreError::Internal(format!("corrupt price column: {e}")))
}

pub(crate) fn timestamp_from_db(text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Internal(format!("corrupt timestamp column: {e}")))
}
