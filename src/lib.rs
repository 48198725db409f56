//! Teamcollab - Main Library
//!
//! A team collaboration backend: users belong to teams, teams own projects,
//! projects hold tasks, and every team has a chat channel. Access is gated
//! by role (ADMIN, MANAGER, MEMBER), team membership and task assignment.
//! Task and message changes are pushed to connected clients in the team's
//! realtime room.
//!
//! # Module Structure
//!
//! - **`shared`** - Types with no server dependencies
//!   - Domain model and populated views
//!   - The access decision table and task visibility filter
//!   - Request payloads with their validation rules
//!   - Realtime events and the response envelope
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket endpoint
//!   - PostgreSQL and in-memory repositories
//!   - JWT sessions and bcrypt passwords
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend module and its dependencies
//!
//! # Usage
//!
//! ```rust,no_run
//! use teamcollab::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() {
//! let app = create_app(ServerConfig::from_env()).await;
//! // Serve with axum::serve
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
