//! # Cursor Pagination
//!
//! Pages are ordered by a monotonic column, descending. The client passes the
//! order value of the last record it saw as the cursor, and the next page
//! starts at that value (inclusive).
//!
//! ```text
//! <base query with WHERE> [AND <order column> <= ?] ORDER BY <order column> DESC LIMIT ?
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};

use crate::store::{SqlValue, Statement, Store};

use super::errors::{RestError, RestResult};
use super::projector::{project, Record, DEFAULT_REDACTED};
use super::selection::Predicate;

/// Maximum page size
pub const MAX_COUNT: usize = 1000;

/// Page size when `count` is not given
pub const DEFAULT_COUNT: usize = 100;

/// Query parameter carrying the page size
pub const COUNT_PARAM: &str = "count";

/// Cursor parameter for id-ordered pages
pub const MAX_ID_PARAM: &str = "max_id";

/// Cursor parameter for registration-date-ordered pages
pub const MAX_REGISTRATION_DATE_PARAM: &str = "max_registration_date";

/// Timestamp layout used by the database
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How a cursor value is validated before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Integer,
    Timestamp,
}

impl CursorKind {
    fn parse(self, param: &str, raw: &str) -> RestResult<SqlValue> {
        match self {
            CursorKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| RestError::invalid(format!("{} must be an integer", param))),
            CursorKind::Timestamp => normalize_timestamp(raw)
                .map(SqlValue::Text)
                .ok_or_else(|| {
                    RestError::invalid(format!("{} must be a YYYY-MM-DD HH:MM:SS timestamp", param))
                }),
        }
    }
}

/// Normalize `YYYY-MM-DD HH:MM:SS`, the `T`-separated form and RFC 3339 to
/// the database layout
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.naive_utc())
        })
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Parse the `count` parameter
pub fn parse_count(raw: Option<&str>) -> RestResult<usize> {
    let raw = match raw {
        Some(raw) => raw.trim(),
        None => return Ok(DEFAULT_COUNT),
    };

    let count = raw
        .parse::<i64>()
        .map_err(|_| RestError::invalid(format!("count '{}' is not an integer", raw)))?;

    if count <= 0 {
        return Err(RestError::invalid(format!("count must be positive, got {}", count)));
    }

    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if count > MAX_COUNT {
        return Err(RestError::LimitExceeded(count, MAX_COUNT));
    }

    Ok(count)
}

/// Validated page size and cursor
#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub count: usize,
    pub cursor: Option<SqlValue>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            cursor: None,
        }
    }
}

impl PageParams {
    /// Read `count` and the cursor parameter from request parameters
    pub fn parse(
        params: &HashMap<String, String>,
        cursor_param: &str,
        kind: CursorKind,
    ) -> RestResult<Self> {
        let count = parse_count(params.get(COUNT_PARAM).map(String::as_str))?;
        let cursor = params
            .get(cursor_param)
            .map(|raw| kind.parse(cursor_param, raw))
            .transpose()?;

        Ok(Self { count, cursor })
    }

    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }
}

/// A base query plus how to page through it
#[derive(Debug, Clone)]
pub struct PageQuery {
    base_sql: String,
    args: Vec<SqlValue>,
    order_column: &'static str,
    cursor_param: &'static str,
    cursor_kind: CursorKind,
}

impl PageQuery {
    /// `base_sql` must end in a WHERE clause; `args` bind its placeholders.
    ///
    /// Defaults to ordering by `id` with the `max_id` cursor.
    pub fn new(base_sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            base_sql: base_sql.into(),
            args,
            order_column: "id",
            cursor_param: MAX_ID_PARAM,
            cursor_kind: CursorKind::Integer,
        }
    }

    /// `<select> WHERE <predicate>`
    pub fn filtered(select: &str, predicate: Predicate) -> Self {
        let (condition, args) = predicate.into_parts();
        Self::new(format!("{} WHERE {}", select, condition), args)
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_column = column;
        self
    }

    pub fn cursor(mut self, param: &'static str, kind: CursorKind) -> Self {
        self.cursor_param = param;
        self.cursor_kind = kind;
        self
    }

    pub fn cursor_param(&self) -> &'static str {
        self.cursor_param
    }

    /// Validate `count` and this query's cursor parameter
    pub fn params(&self, request: &HashMap<String, String>) -> RestResult<PageParams> {
        PageParams::parse(request, self.cursor_param, self.cursor_kind)
    }

    /// The bounded statement for one page
    pub fn statement(&self, page: &PageParams) -> Statement {
        let mut sql = self.base_sql.clone();
        let mut args = self.args.clone();

        if let Some(cursor) = &page.cursor {
            sql.push_str(&format!(" AND {} <= ?", self.order_column));
            args.push(cursor.clone());
        }

        sql.push_str(&format!(" ORDER BY {} DESC LIMIT ?", self.order_column));
        args.push(SqlValue::Integer(page.count as i64));

        Statement::new(sql, args)
    }
}

/// Fetch one page described by request parameters
pub async fn paginate(
    store: &Store,
    query: &PageQuery,
    request: &HashMap<String, String>,
) -> RestResult<Vec<Record>> {
    let page = query.params(request)?;
    fetch_page(store, query, &page).await
}

/// Fetch one page with already validated parameters
pub async fn fetch_page(store: &Store, query: &PageQuery, page: &PageParams) -> RestResult<Vec<Record>> {
    let statement = query.statement(page);
    let rows = store.fetch(&statement.sql, &statement.args).await?;
    Ok(project(rows, DEFAULT_REDACTED))
}
