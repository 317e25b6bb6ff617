//! # Mutation Builders
//!
//! INSERT and UPDATE statements from a `FormSource`. Column names always
//! come from the caller's allow-list; a field name is only ever compared
//! against it, never copied into SQL.

use crate::store::{SqlValue, Statement};

use super::errors::{RestError, RestResult};
use super::form::{is_absent, FormSource};
use super::tables::Table;

/// Reject the request unless every `required` field carries a value.
///
/// The absent markers the insert builder skips count as missing.
pub fn validate_required(form: &dyn FormSource, required: &[&str]) -> RestResult<()> {
    match required.iter().find(|name| !form.has(name)) {
        Some(name) => Err(RestError::MissingParam((*name).to_string())),
        None => Ok(()),
    }
}

/// `INSERT INTO table (...) VALUES (...)` over the supplied allowed fields.
///
/// Absent markers are skipped so the column takes its default.
pub fn insert_statement(
    table: Table,
    allowed: &[&'static str],
    form: &dyn FormSource,
) -> RestResult<Statement> {
    let assignments = collect_assignments(allowed, form, &[])?;

    if assignments.is_empty() {
        return Ok(Statement::new(
            format!("INSERT INTO {} DEFAULT VALUES", table),
            Vec::new(),
        ));
    }

    let (columns, args): (Vec<&'static str>, Vec<SqlValue>) = assignments.into_iter().unzip();
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok(Statement::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ),
        args,
    ))
}

/// `UPDATE table SET ... WHERE id = ?` over the supplied allowed fields.
///
/// The `id` field names the row and is never updated.
pub fn update_statement(
    table: Table,
    allowed: &[&'static str],
    id: i64,
    form: &dyn FormSource,
) -> RestResult<Statement> {
    let assignments = collect_assignments(allowed, form, &["id"])?;

    if assignments.is_empty() {
        return Err(RestError::invalid("no updatable fields supplied"));
    }

    let (columns, mut args): (Vec<&'static str>, Vec<SqlValue>) = assignments.into_iter().unzip();
    let set_clause = columns
        .iter()
        .map(|column| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");
    args.push(SqlValue::Integer(id));

    Ok(Statement::new(
        format!("UPDATE {} SET {} WHERE id = ?", table, set_clause),
        args,
    ))
}

/// Pair each supplied allowed column with its bound value, in allow-list
/// order
fn collect_assignments(
    allowed: &[&'static str],
    form: &dyn FormSource,
    ignored: &[&str],
) -> RestResult<Vec<(&'static str, SqlValue)>> {
    for name in form.field_names() {
        if ignored.iter().any(|skip| *skip == name) {
            continue;
        }
        let supplied = form.field(name).map(|v| !is_absent(v)).unwrap_or(false);
        if supplied && !allowed.iter().any(|column| *column == name) {
            return Err(RestError::invalid(format!("unknown field '{}'", name)));
        }
    }

    let mut assignments = Vec::new();
    for column in allowed {
        let value = match form.field(column) {
            Some(value) if !is_absent(value) => value,
            _ => continue,
        };
        let value = SqlValue::from_json(value)
            .ok_or_else(|| RestError::invalid(format!("field '{}' must be a scalar", column)))?;
        assignments.push((*column, value));
    }

    Ok(assignments)
}
