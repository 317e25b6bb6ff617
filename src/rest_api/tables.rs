//! # Tables
//!
//! The closed set of tables the API touches, and the by-id lookups shared by
//! every resource.

use std::fmt;

use crate::store::{SqlValue, Store};

use super::errors::RestResult;
use super::projector::{project_one, Lookup, DEFAULT_REDACTED};

/// A table name usable in generated SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Networks,
    Events,
    Posts,
    EventRegistration,
    NetworkRegistration,
    Countries,
    Regions,
    Cities,
    Languages,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Networks => "networks",
            Table::Events => "events",
            Table::Posts => "posts",
            Table::EventRegistration => "event_registration",
            Table::NetworkRegistration => "network_registration",
            Table::Countries => "countries",
            Table::Regions => "regions",
            Table::Cities => "cities",
            Table::Languages => "languages",
        }
    }

    /// Singular noun used in error messages
    pub fn entity(&self) -> &'static str {
        match self {
            Table::Users => "user",
            Table::Networks => "network",
            Table::Events => "event",
            Table::Posts => "post",
            Table::EventRegistration => "event registration",
            Table::NetworkRegistration => "network registration",
            Table::Countries => "country",
            Table::Regions => "region",
            Table::Cities => "city",
            Table::Languages => "language",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fetch one row by primary key, redacted
pub async fn fetch_by_id(store: &Store, table: Table, id: i64) -> RestResult<Lookup> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", table);
    let rows = store.fetch_optional(&sql, &[SqlValue::Integer(id)]).await?;
    Ok(project_one(rows, DEFAULT_REDACTED))
}

/// Whether a row with this primary key exists
pub async fn exists(store: &Store, table: Table, id: i64) -> RestResult<bool> {
    let sql = format!("SELECT id FROM {} WHERE id = ?", table);
    let rows = store.fetch_optional(&sql, &[SqlValue::Integer(id)]).await?;
    Ok(!rows.is_empty())
}

/// Run a single-row aggregate such as `SELECT count(*) AS post_count ...`
pub async fn fetch_single(store: &Store, sql: &str, args: &[SqlValue]) -> RestResult<Lookup> {
    let rows = store.fetch_optional(sql, args).await?;
    Ok(project_one(rows, DEFAULT_REDACTED))
}
