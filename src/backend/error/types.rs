/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are returned by commands and handlers and are converted to
 * HTTP responses in `conversion`.
 *
 * # Error Categories
 *
 * ## Client Errors
 *
 * - `NotFound` (404) - a referenced record does not exist
 * - `Forbidden` (403) - the access engine denied the action
 * - `Unauthorized` (401) - missing, invalid or stale credentials
 * - `Validation` (400) - malformed input, with one message per field
 * - `Conflict` (409) - a uniqueness rule was violated
 * - `TooManyRequests` (429) - the client exceeded the request rate limit
 *
 * ## Server Errors
 *
 * Store, token, hashing and serialization failures all map to 500. Their
 * details are logged but never sent to the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use teamcollab::backend::error::BackendError;
///
/// let err = BackendError::not_found("Task not found");
/// assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The access engine denied the action
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Request input failed validation
    ///
    /// `errors` holds one human-readable message per failing field.
    #[error("Validation error: {message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Too many requests: {message}")]
    TooManyRequests { message: String },

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// JWT encoding or decoding failure
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failure
    #[error("Hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BackendError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    /// Create a validation error with a single field message
    ///
    /// # Arguments
    ///
    /// * `message` - Message listed in the `errors` array
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: "Validation Error".to_string(),
            errors: vec![message.into()],
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::TooManyRequests { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(StoreError::Duplicate { .. }) => StatusCode::CONFLICT,
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            Self::Store(_)
            | Self::Token(_)
            | Self::Hashing(_)
            | Self::SharedError(_)
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing message for this error
    ///
    /// Server errors collapse to a generic message.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { message }
            | Self::Forbidden { message }
            | Self::Unauthorized { message }
            | Self::Validation { message, .. }
            | Self::Conflict { message }
            | Self::TooManyRequests { message } => message.clone(),
            Self::Store(StoreError::Duplicate { field }) => format!("{} already exists", field),
            Self::SharedError(SharedError::ValidationError { .. }) => "Validation Error".to_string(),
            _ => "Internal Server Error".to_string(),
        }
    }

    /// Per-field messages, only populated for validation failures
    pub fn errors(&self) -> Vec<String> {
        match self {
            Self::Validation { errors, .. } => errors.clone(),
            Self::SharedError(err @ SharedError::ValidationError { .. }) => {
                vec![err.field_message().to_string()]
            }
            _ => Vec::new(),
        }
    }
}

impl From<Vec<SharedError>> for BackendError {
    fn from(errors: Vec<SharedError>) -> Self {
        Self::Validation {
            message: "Validation Error".to_string(),
            errors: errors.iter().map(|e| e.field_message().to_string()).collect(),
        }
    }
}
