//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in commands and HTTP handlers and can be converted
//! to HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - Error type definitions and constructors
//! - **`conversion`** - `IntoResponse` implementation
//!
//! # HTTP Response Conversion
//!
//! All backend errors implement `IntoResponse` from Axum, so a handler can
//! return `Result<_, BackendError>` and the error becomes a status code plus
//! the standard JSON envelope.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
