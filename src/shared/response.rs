/**
 * Response Envelope
 *
 * Every API response, success or failure, is wrapped in the same JSON
 * envelope:
 *
 * ```json
 * { "success": true, "message": "Task created", "data": { "task": { ... } } }
 * ```
 *
 * Validation failures add an `errors` array with one message per failing
 * field; it is omitted otherwise.
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<()> {
    /// A successful response with no payload
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }
}
