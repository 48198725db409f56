//! Middleware Module
//!
//! This module contains HTTP middleware and request extractors for the
//! backend server. Middleware runs before handlers; extractors pull typed,
//! already-checked values out of the request.
//!
//! # Architecture
//!
//! - **`auth`** - Bearer token verification and the `AuthUser` extractor
//! - **`validate`** - `ValidJson`, `ValidQuery` and `PathId` extractors
//! - **`rate_limit`** - Per-IP fixed-window limit on `/api` requests
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{middleware, routing::get, Router};
//! use teamcollab::backend::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/api/tasks", get(list_tasks))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;
pub mod rate_limit;
pub mod validate;

pub use auth::{auth_middleware, bearer_token, resolve_identity, AuthUser};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use validate::{PathId, ValidJson, ValidQuery};
