//! # Record Projector
//!
//! Turns positional rows into JSON objects keyed by column name and strips
//! sensitive fields before they leave the process.

use serde_json::{Map, Value};

use crate::store::Rows;

use super::errors::{RestError, RestResult};

/// One projected row
pub type Record = Map<String, Value>;

/// Fields removed from every record returned to clients
pub const DEFAULT_REDACTED: &[&str] = &["password", "email"];

/// Outcome of a single-row lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Record),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<Record> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::NotFound => None,
        }
    }

    /// `NotFound` becomes `RestError::NotFound`
    pub fn into_result(self) -> RestResult<Record> {
        self.found().ok_or(RestError::NotFound)
    }
}

/// Project every row, removing `redact` fields
pub fn project(rows: Rows, redact: &[&str]) -> Vec<Record> {
    let Rows { columns, values } = rows;
    values
        .into_iter()
        .map(|row| project_row(&columns, row, redact))
        .collect()
}

/// Project the first row of a single-row lookup
pub fn project_one(rows: Rows, redact: &[&str]) -> Lookup {
    match project(rows, redact).into_iter().next() {
        Some(record) => Lookup::Found(record),
        None => Lookup::NotFound,
    }
}

fn project_row(columns: &[String], row: Vec<Value>, redact: &[&str]) -> Record {
    let mut record: Record = columns.iter().cloned().zip(row).collect();
    for field in redact {
        record.remove(*field);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_rows() -> Rows {
        Rows::new(
            vec![
                "id".to_string(),
                "username".to_string(),
                "email".to_string(),
                "password".to_string(),
            ],
            vec![
                vec![json!(2), json!("iolo"), json!("iolo@example.com"), json!("$argon2id$...")],
                vec![json!(1), json!("maria"), json!("maria@example.com"), json!("$argon2id$...")],
            ],
        )
    }

    #[test]
    fn test_project_zips_columns() {
        let records = project(user_rows(), &[]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!(2));
        assert_eq!(records[1]["username"], json!("maria"));
    }

    #[test]
    fn test_redaction_removes_sensitive_fields() {
        let records = project(user_rows(), DEFAULT_REDACTED);

        for record in &records {
            assert!(!record.contains_key("password"));
            assert!(!record.contains_key("email"));
            assert!(record.contains_key("username"));
        }
    }

    #[test]
    fn test_redaction_without_sensitive_columns() {
        let rows = Rows::new(
            vec!["id".to_string(), "title".to_string()],
            vec![vec![json!(4), json!("Cawl night")]],
        );
        let records = project(rows, DEFAULT_REDACTED);

        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0]["title"], json!("Cawl night"));
    }

    #[test]
    fn test_empty_rows_project_to_empty_page() {
        assert!(project(Rows::default(), DEFAULT_REDACTED).is_empty());
    }

    #[test]
    fn test_single_lookup_found() {
        let lookup = project_one(user_rows(), DEFAULT_REDACTED);
        let record = lookup.into_result().unwrap();
        assert_eq!(record["id"], json!(2));
        assert!(!record.contains_key("email"));
    }

    #[test]
    fn test_single_lookup_not_found_is_distinct() {
        let lookup = project_one(Rows::default(), DEFAULT_REDACTED);

        assert_eq!(lookup, Lookup::NotFound);
        assert!(matches!(lookup.into_result(), Err(RestError::NotFound)));
    }
}
