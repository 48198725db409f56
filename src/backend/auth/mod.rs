//! Authentication Module
//!
//! This module handles user registration, credential checks, session tokens
//! and the bridge between the access engine and HTTP errors.
//!
//! # Architecture
//!
//! - **`users`** - Registration, login and profile lookup
//! - **`sessions`** - JWT token generation and validation
//! - **`guard`** - Turns access denials into `Forbidden` errors
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens carry only the user id; role and team are reloaded per request
//! - Invalid credentials return 401 (no information leakage)

/// Registration, login and profile lookup
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Authorization guard
pub mod guard;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use guard::authorize;
pub use handlers::{get_me, login, register};
pub use sessions::{Claims, TokenService};
