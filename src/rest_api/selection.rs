//! # Selection
//!
//! Identifier parsing and the conjunctive predicate builder.
//!
//! Clients send `-1` (or `null`) for "no such component", e.g. a network
//! whose current location has a country but no city. That wire sentinel is
//! turned into `None` here, once, and every later stage works on `Option`.

use crate::store::SqlValue;

use super::errors::{RestError, RestResult};

/// Wire-level identifier meaning "match NULL"
pub const NULL_ID: i64 = -1;

/// True for `NULL_ID` and `null` in any case
pub fn is_null_sentinel(raw: &str) -> bool {
    let raw = raw.trim();
    raw.parse::<i64>().ok() == Some(NULL_ID) || raw.eq_ignore_ascii_case("null")
}

/// Parse an identifier that may carry the null sentinel.
///
/// Returns `None` for the sentinel and `Some(id)` for a positive integer.
pub fn parse_id(raw: &str) -> RestResult<Option<i64>> {
    if is_null_sentinel(raw) {
        return Ok(None);
    }

    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(RestError::invalid(format!("'{}' is not a valid id", raw))),
    }
}

/// Parse an identifier that must name a row
pub fn require_id(raw: &str) -> RestResult<i64> {
    parse_id(raw)?.ok_or_else(|| RestError::invalid(format!("'{}' is not a valid id", raw)))
}

/// A `country,region,city` triple of optional ids
pub type Location = [Option<i64>; 3];

/// Parse `country,region,city`, each component an id or the null sentinel
pub fn parse_location(raw: &str) -> RestResult<Location> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 3 {
        return Err(RestError::invalid(format!(
            "location '{}' must be country,region,city",
            raw
        )));
    }

    Ok([parse_id(parts[0])?, parse_id(parts[1])?, parse_id(parts[2])?])
}

/// Lift optional ids into selection values
pub fn id_values(ids: &[Option<i64>]) -> Vec<Option<SqlValue>> {
    ids.iter().map(|id| id.map(SqlValue::Integer)).collect()
}

/// Conjunction of `col = ?` and `col IS NULL` clauses.
///
/// `args` holds one value per `= ?` clause, in clause order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<String>,
    args: Vec<SqlValue>,
}

impl Predicate {
    /// Build a predicate from parallel value and column lists.
    ///
    /// `None` selects `col IS NULL`; `Some(v)` selects `col = ?` and binds
    /// `v`.
    pub fn build(values: &[Option<SqlValue>], columns: &[&'static str]) -> RestResult<Self> {
        if values.len() != columns.len() {
            return Err(RestError::invalid(format!(
                "{} selection values for {} columns",
                values.len(),
                columns.len()
            )));
        }

        let mut predicate = Predicate::default();
        for (value, column) in values.iter().zip(columns) {
            match value {
                Some(value) => {
                    predicate.clauses.push(format!("{} = ?", column));
                    predicate.args.push(value.clone());
                }
                None => predicate.clauses.push(format!("{} IS NULL", column)),
            }
        }

        Ok(predicate)
    }

    /// Single equality clause
    pub fn eq(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            clauses: vec![format!("{} = ?", column)],
            args: vec![value.into()],
        }
    }

    /// Conjoin another predicate after this one
    pub fn and(mut self, other: Predicate) -> Self {
        self.clauses.extend(other.clauses);
        self.args.extend(other.args);
        self
    }

    /// Predicate text, clauses joined by `AND`
    pub fn sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    /// Values for the `?` placeholders, in order
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql(), self.args)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUR: [&str; 3] = ["id_country_cur", "id_region_cur", "id_city_cur"];

    #[test]
    fn test_sentinel_forms() {
        assert!(is_null_sentinel("-1"));
        assert!(is_null_sentinel("null"));
        assert!(is_null_sentinel("NULL"));
        assert!(is_null_sentinel("Null"));
        assert!(!is_null_sentinel("1"));
        assert!(is_null_sentinel(&NULL_ID.to_string()));
        assert!(!is_null_sentinel(""));
        assert!(!is_null_sentinel("-2"));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), Some(42));
        assert_eq!(parse_id("-1").unwrap(), None);
        assert_eq!(parse_id("null").unwrap(), None);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-7").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("1; DROP TABLE users").is_err());
    }

    #[test]
    fn test_require_id_rejects_sentinel() {
        assert_eq!(require_id("5").unwrap(), 5);
        assert!(matches!(require_id("-1"), Err(RestError::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            parse_location("1,-1,332").unwrap(),
            [Some(1), None, Some(332)]
        );
        assert_eq!(parse_location("null,null,null").unwrap(), [None, None, None]);
        assert!(parse_location("1,2").is_err());
        assert!(parse_location("1,2,3,4").is_err());
        assert!(parse_location("1,x,3").is_err());
    }

    #[test]
    fn test_build_mixed() {
        let values = id_values(&[Some(1), None, Some(332)]);
        let predicate = Predicate::build(&values, &CUR).unwrap();

        assert_eq!(
            predicate.sql(),
            "id_country_cur = ? AND id_region_cur IS NULL AND id_city_cur = ?"
        );
        assert_eq!(
            predicate.args(),
            &[SqlValue::Integer(1), SqlValue::Integer(332)]
        );
    }

    #[test]
    fn test_build_all_null() {
        let predicate = Predicate::build(&[None, None, None], &CUR).unwrap();

        assert!(predicate.args().is_empty());
        assert_eq!(
            predicate.sql(),
            "id_country_cur IS NULL AND id_region_cur IS NULL AND id_city_cur IS NULL"
        );
    }

    #[test]
    fn test_build_without_sentinels() {
        let values = id_values(&[Some(3), Some(30), Some(300)]);
        let predicate = Predicate::build(&values, &CUR).unwrap();

        assert_eq!(predicate.sql().matches("= ?").count(), values.len());
        assert!(!predicate.sql().contains("IS NULL"));
        assert_eq!(
            predicate.sql(),
            "id_country_cur = ? AND id_region_cur = ? AND id_city_cur = ?"
        );
        assert_eq!(
            predicate.args(),
            &[SqlValue::Integer(3), SqlValue::Integer(30), SqlValue::Integer(300)]
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        for ids in [[Some(1), None, Some(332)], [None, None, None], [Some(4), Some(5), Some(6)]] {
            let values = id_values(&ids);
            let first = Predicate::build(&values, &CUR).unwrap();
            let second = Predicate::build(&values, &CUR).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.sql(), second.sql());
        }
    }

    #[test]
    fn test_length_mismatch_is_invalid_argument() {
        let err = Predicate::build(&id_values(&[Some(1)]), &CUR).unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn test_and_preserves_argument_order() {
        let predicate = Predicate::build(&id_values(&[Some(1), None, None]), &CUR)
            .unwrap()
            .and(Predicate::eq("language_origin", "Welsh"));

        assert_eq!(
            predicate.sql(),
            "id_country_cur = ? AND id_region_cur IS NULL AND id_city_cur IS NULL AND language_origin = ?"
        );
        assert_eq!(
            predicate.args(),
            &[SqlValue::Integer(1), SqlValue::from("Welsh")]
        );
    }
}
