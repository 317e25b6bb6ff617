//! # Store
//!
//! Thin wrapper over an `sqlx` SQLite pool. Every statement is a SQL text
//! with `?` placeholders plus a parallel argument vector; no caller value is
//! ever interpolated into SQL text.
//!
//! Rows come back untyped: column names plus JSON scalars decoded by the
//! value's storage class.

mod errors;
mod value;

pub use errors::{StoreError, StoreResult};
pub use value::SqlValue;

use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Decode, Row, TypeInfo, ValueRef};

use crate::observability::{Event, Logger, MetricsRegistry};

/// Bundled DDL applied by `Store::apply_schema`
pub const SCHEMA: &str = include_str!("schema.sql");

/// A SQL statement and its positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

/// Raw query result: column names and positional row values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Value>>,
}

impl Rows {
    pub fn new(columns: Vec<String>, values: Vec<Vec<Value>>) -> Self {
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn from_sqlite(rows: &[SqliteRow]) -> StoreResult<Self> {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let values = rows.iter().map(decode_row).collect::<StoreResult<_>>()?;

        Ok(Self { columns, values })
    }
}

/// Outcome of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

/// Connection-pooled access to the database
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    metrics: Arc<MetricsRegistry>,
}

impl Store {
    /// Connect to a database URL such as `sqlite://culturemesh.db`
    pub async fn connect(
        url: &str,
        max_connections: u32,
        metrics: Arc<MetricsRegistry>,
    ) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool, metrics })
    }

    /// Private in-memory database on a single pinned connection
    pub async fn in_memory(metrics: Arc<MetricsRegistry>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Each connection to :memory: is its own database, so the pool must
        // never open a second one or recycle the first.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool, metrics })
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Create all tables and indexes if they do not exist
    pub async fn apply_schema(&self) -> StoreResult<()> {
        let statements: Vec<Statement> = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|sql| !sql.is_empty())
            .map(|sql| Statement::new(sql, Vec::new()))
            .collect();

        self.execute_all(&statements).await?;
        Ok(())
    }

    /// Run a read query and return every row
    pub async fn fetch(&self, sql: &str, args: &[SqlValue]) -> StoreResult<Rows> {
        let result = bind_all(sqlx::query(sql), args)
            .fetch_all(&self.pool)
            .await;
        let rows = self.observe(sql, result)?;
        self.metrics.add_rows_returned(rows.len() as u64);

        Rows::from_sqlite(&rows)
    }

    /// Run a read query expected to match at most one row
    pub async fn fetch_optional(&self, sql: &str, args: &[SqlValue]) -> StoreResult<Rows> {
        let result = bind_all(sqlx::query(sql), args)
            .fetch_optional(&self.pool)
            .await;
        let row = self.observe(sql, result)?;

        match row {
            Some(row) => {
                self.metrics.add_rows_returned(1);
                Rows::from_sqlite(std::slice::from_ref(&row))
            }
            None => Ok(Rows::default()),
        }
    }

    /// Run a single write statement
    pub async fn execute(&self, sql: &str, args: &[SqlValue]) -> StoreResult<ExecOutcome> {
        let result = bind_all(sqlx::query(sql), args)
            .execute(&self.pool)
            .await;
        let done = self.observe(sql, result)?;
        self.metrics.increment_writes();

        Ok(ExecOutcome {
            rows_affected: done.rows_affected(),
            last_insert_id: done.last_insert_rowid(),
        })
    }

    /// Run statements in order inside one transaction.
    ///
    /// Either every statement commits or none does. Outcomes are returned in
    /// statement order.
    pub async fn execute_all(&self, statements: &[Statement]) -> StoreResult<Vec<ExecOutcome>> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(statements.len());

        for statement in statements {
            let result = bind_all(sqlx::query(&statement.sql), &statement.args)
                .execute(&mut *tx)
                .await;
            // Dropping `tx` on the error path rolls back.
            let done = self.observe(&statement.sql, result)?;
            outcomes.push(ExecOutcome {
                rows_affected: done.rows_affected(),
                last_insert_id: done.last_insert_rowid(),
            });
        }

        tx.commit().await?;
        self.metrics.increment_writes();

        Ok(outcomes)
    }

    /// Count the query and log failures before classifying them
    fn observe<T>(&self, sql: &str, result: Result<T, sqlx::Error>) -> StoreResult<T> {
        match result {
            Ok(value) => {
                self.metrics.increment_queries_executed();
                Ok(value)
            }
            Err(err) => {
                self.metrics.increment_queries_failed();
                let message = err.to_string();
                Logger::error(Event::QueryFailed.as_str(), &[("error", message.as_str()), ("sql", sql)]);
                Err(StoreError::from(err))
            }
        }
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> StoreResult<Vec<Value>> {
    (0..row.len()).map(|index| decode_column(row, index)).collect()
}

/// Decode one column by the storage class of its value
fn decode_column(row: &SqliteRow, index: usize) -> StoreResult<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let storage_class = raw.type_info().name().to_string();
    let value = match storage_class.as_str() {
        "INTEGER" => Value::from(<i64 as Decode<'_, Sqlite>>::decode(raw).map_err(sqlx::Error::Decode)?),
        "REAL" => {
            let v = <f64 as Decode<'_, Sqlite>>::decode(raw).map_err(sqlx::Error::Decode)?;
            serde_json::Number::from_f64(v)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        "BLOB" => {
            let bytes = <Vec<u8> as Decode<'_, Sqlite>>::decode(raw).map_err(sqlx::Error::Decode)?;
            Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        _ => Value::String(<String as Decode<'_, Sqlite>>::decode(raw).map_err(sqlx::Error::Decode)?),
    };

    Ok(value)
}
