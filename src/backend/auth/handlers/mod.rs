//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register - User registration
//! - **`login`** - POST /api/auth/login - User authentication
//! - **`get_me`** - GET /api/auth/me - Current user profile
//!
//! # Authentication Flow
//!
//! 1. **Register**: email, name, password and optional role/team → user created → JWT returned
//! 2. **Login**: email and password → credentials verified → JWT returned
//! 3. **Me**: JWT → verified by middleware → profile returned

/// Response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

pub use types::{AuthResponse, MeResponse};

pub use login::login;
pub use me::get_me;
pub use register::register;
