//! Shared Error Types
//!
//! This module defines error types that are shared between the domain layer
//! and the server. They represent failures that can be detected without any
//! I/O: malformed input caught by the request gate, and payloads that fail
//! to serialize.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - A single field failed validation
//!
//! # Usage
//!
//! ```rust
//! use teamcollab::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "Task title must be at least 3 characters");
//! assert_eq!(error.field_message(), "Task title must be at least 3 characters");
//! ```

use thiserror::Error;

/// Errors produced by the shared domain layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Serialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Error message
        message: String,
    },

    /// Validation error for a single request field
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Field name as it appears on the wire
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The bare message, without the field prefix used by `Display`.
    ///
    /// This is what ends up in the `errors` list of a validation response.
    pub fn field_message(&self) -> &str {
        match self {
            Self::SerializationError { message } => message,
            Self::ValidationError { message, .. } => message,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("email", "Please provide a valid email");
        match error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Please provide a valid email");
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_error_display() {
        let error = SharedError::validation("name", "Name is required");
        let display = format!("{}", error);
        assert!(display.contains("'name'"));
        assert!(display.contains("Name is required"));
    }

    #[test]
    fn test_field_message_strips_field() {
        let error = SharedError::validation("content", "Message cannot be empty");
        assert_eq!(error.field_message(), "Message cannot be empty");
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let shared_error: SharedError = result.unwrap_err().into();

        match shared_error {
            SharedError::SerializationError { .. } => {}
            _ => panic!("Expected SerializationError from serde error"),
        }
    }
}
