//! Authentication-related models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Login request
///
/// The body must be a JSON object; anything else is a malformed request.
/// `password` is kept as a raw JSON value: a missing or non-string password is
/// a failed login, not a malformed request.
#[derive(Debug, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct LoginRequest {
    pub password: Option<Value>,
}

impl From<Map<String, Value>> for LoginRequest {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            password: body.remove("password"),
        }
    }
}

impl LoginRequest {
    /// The submitted secret, if it is a string
    pub fn candidate(&self) -> Option<&str> {
        self.password.as_ref().and_then(Value::as_str)
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
