//! Positional SQL arguments.

use serde_json::Value;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a JSON scalar into a bindable value.
    ///
    /// Returns `None` for arrays and objects, which have no column
    /// representation. Booleans are stored as 0/1.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(SqlValue::Null),
            Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(SqlValue::Integer(i))
                } else {
                    n.as_f64().map(SqlValue::Real)
                }
            }
            Value::String(s) => Some(SqlValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(SqlValue::from_json(&json!(7)), Some(SqlValue::Integer(7)));
        assert_eq!(SqlValue::from_json(&json!(1.5)), Some(SqlValue::Real(1.5)));
        assert_eq!(
            SqlValue::from_json(&json!("Paris")),
            Some(SqlValue::Text("Paris".to_string()))
        );
        assert_eq!(SqlValue::from_json(&json!(true)), Some(SqlValue::Integer(1)));
        assert_eq!(SqlValue::from_json(&Value::Null), Some(SqlValue::Null));
    }

    #[test]
    fn test_from_json_rejects_composites() {
        assert_eq!(SqlValue::from_json(&json!([1, 2])), None);
        assert_eq!(SqlValue::from_json(&json!({"a": 1})), None);
    }
}
