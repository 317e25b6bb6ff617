//! # Response Formatting
//!
//! Bodies for mutation endpoints. Reads return bare records or arrays of
//! records.

use serde::Serialize;

/// Body of a successful create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

impl CreatedResponse {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Body of a successful update or registration change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "OK" }
    }
}

/// Human-readable outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delete response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: i64,
}

impl DeleteResponse {
    pub fn success(id: i64) -> Self {
        Self { deleted: true, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_serialization() {
        let json = serde_json::to_string(&CreatedResponse::new(7)).unwrap();
        assert_eq!(json, r#"{"id":7}"#);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&StatusResponse::ok()).unwrap();
        assert_eq!(json, r#"{"status":"OK"}"#);
    }

    #[test]
    fn test_delete_serialization() {
        let json = serde_json::to_string(&DeleteResponse::success(3)).unwrap();
        assert!(json.contains(r#""deleted":true"#));
        assert!(json.contains(r#""id":3"#));
    }
}
