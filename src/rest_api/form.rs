//! # Form Sources
//!
//! Mutation builders read fields through `FormSource`, so the same insert and
//! validation path serves a client's JSON body and requests the server
//! synthesizes itself (such as a network created on first lookup).

use serde_json::{Map, Value};

use super::errors::{RestError, RestResult};
use super::selection::{is_null_sentinel, NULL_ID};

/// Key/value view of a request. Forms are borrowed across store awaits
/// inside handlers, so they must be shareable between threads.
pub trait FormSource: Send + Sync {
    /// Raw value of a field
    fn field(&self, name: &str) -> Option<&Value>;

    /// Names of all fields present
    fn field_names(&self) -> Vec<&str>;

    /// True when the field is present and not an absent marker
    fn has(&self, name: &str) -> bool {
        self.field(name).map(|v| !is_absent(v)).unwrap_or(false)
    }

    /// Scalar field rendered as text
    fn text(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Values treated as "not supplied": null, empty string, `-1` and `null`
/// strings. Zero is a real value.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty() || is_null_sentinel(s),
        Value::Number(n) => n.as_i64() == Some(NULL_ID),
        _ => false,
    }
}

/// The JSON object body of a client request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestForm {
    fields: Map<String, Value>,
}

impl RequestForm {
    /// Accepts only a JSON object
    pub fn from_body(body: Value) -> RestResult<Self> {
        match body {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RestError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl FormSource for RequestForm {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

/// A request assembled by the server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PseudoForm {
    fields: Map<String, Value>,
}

impl PseudoForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }
}

impl From<RequestForm> for PseudoForm {
    fn from(form: RequestForm) -> Self {
        Self {
            fields: form.fields,
        }
    }
}

impl FormSource for PseudoForm {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_shareable<T: Send + Sync + ?Sized>() {}

    #[test]
    fn test_forms_are_shareable_across_threads() {
        assert_shareable::<dyn FormSource>();
        assert_shareable::<RequestForm>();
        assert_shareable::<PseudoForm>();
    }

    #[test]
    fn test_absent_markers() {
        assert!(is_absent(&json!(null)));
        assert!(is_absent(&json!("")));
        assert!(is_absent(&json!("-1")));
        assert!(is_absent(&json!(-1)));
        assert!(is_absent(&json!("NULL")));
        assert!(!is_absent(&json!(0)));
        assert!(!is_absent(&json!("0")));
        assert!(!is_absent(&json!("Cardiff")));
    }

    #[test]
    fn test_request_form_requires_object() {
        assert!(RequestForm::from_body(json!({"title": "Cawl"})).is_ok());
        assert!(matches!(
            RequestForm::from_body(json!([1, 2])),
            Err(RestError::InvalidBody(_))
        ));
        assert!(RequestForm::from_body(Value::Null).is_err());
    }

    #[test]
    fn test_text_and_has() {
        let form = RequestForm::from_body(json!({
            "title": "Cawl",
            "id_network": 4,
            "address_2": null,
            "region": "-1",
        }))
        .unwrap();

        assert_eq!(form.text("title").as_deref(), Some("Cawl"));
        assert_eq!(form.text("id_network").as_deref(), Some("4"));
        assert!(form.has("title"));
        assert!(!form.has("address_2"));
        assert!(!form.has("region"));
        assert!(!form.has("description"));
    }

    #[test]
    fn test_pseudo_form_from_request() {
        let form = RequestForm::from_body(json!({"title": "Cawl"})).unwrap();
        let mut pseudo = PseudoForm::from(form);
        pseudo.set("id_host", 9).set("id_network", 2);

        assert_eq!(pseudo.field("id_host"), Some(&json!(9)));
        let mut names = pseudo.field_names();
        names.sort_unstable();
        assert_eq!(names, vec!["id_host", "id_network", "title"]);
    }
}
