use crate::support::now_rfc3339;
use serde::Deserialize;
use serde_json::{Value, json};

/// One request line: caller identity is an explicit field, never ambient
/// state. `user_id` is absent for the operations that run before a session
/// exists (login, self-registration, forgotten password).
#[derive(Debug, Deserialize)]
pub struct OpRequest {
    pub op: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub args: Value,
}

#[derive(Clone, Debug)]
pub struct OpError {
    pub code: String,
    pub message: String,
}

impl OpError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OpResponse {
    pub op: String,
    pub result: Value,
    pub error: Option<OpError>,
}

impl OpResponse {
    pub fn success(op: &str, result: Value) -> Self {
        Self {
            op: op.to_string(),
            result,
            error: None,
        }
    }

    pub fn failure(op: &str, error: OpError) -> Self {
        Self {
            op: op.to_string(),
            result: json!({}),
            error: Some(error),
        }
    }

    pub fn into_value(self) -> Value {
        json!({
            "success": self.error.is_none(),
            "op": self.op,
            "result": self.result,
            "error": self.error.as_ref().map(|e| json!({
                "code": e.code,
                "message": e.message,
            })).unwrap_or(Value::Null),
            "timestamp": now_rfc3339(),
        })
    }
}

pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, OpError> {
    match args.get(key).and_then(Value::as_str) {
        Some(value) => Ok(value),
        None => Err(OpError::new(
            "INVALID_INPUT",
            format!("{key} must be a string"),
        )),
    }
}

pub(crate) fn optional_str<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or("")
}

pub(crate) fn require_i64(args: &Value, key: &str) -> Result<i64, OpError> {
    match args.get(key).and_then(Value::as_i64) {
        Some(value) => Ok(value),
        None => Err(OpError::new(
            "INVALID_INPUT",
            format!("{key} must be an integer"),
        )),
    }
}
