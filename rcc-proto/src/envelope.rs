//! Northbound HTTP/JSON response envelope (spec §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ApiResponse {
    Ok { data: Value },
    Error {
        code: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl ApiResponse {
    pub fn ok(data: impl Serialize) -> Self {
        ApiResponse::Ok {
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn error_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        ApiResponse::Error {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// A structured error body, used where we need the pieces before wrapping
/// them into an [`ApiResponse`] (e.g. to also log or audit them).
#[derive(Debug, Clone)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}
