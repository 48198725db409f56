//! Backend Module
//!
//! This module contains all server-side code: an Axum HTTP server for team
//! collaboration with role-gated projects, tasks and chat, plus realtime
//! fan-out of changes to team rooms over WebSocket.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - Repository trait with PostgreSQL and in-memory backends
//! - **`auth`** - Registration, login, JWT sessions, authorization guard
//! - **`middleware`** - Token verification and validating extractors
//! - **`teams`**, **`projects`**, **`tasks`**, **`messages`** - Domain commands and handlers
//! - **`realtime`** - Team rooms and the WebSocket endpoint
//! - **`error`** - Backend error type and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── store/          - Persistence
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors and middleware
//! ├── teams/          - Team commands
//! ├── projects/       - Project commands
//! ├── tasks/          - Task commands
//! ├── messages/       - Team chat commands
//! ├── realtime/       - Event fan-out
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! 1. `auth_middleware` verifies the token and loads the caller's `Identity`
//! 2. Validating extractors reject malformed bodies with 400
//! 3. The command loads every referenced record, returning 404 if absent
//! 4. `shared::access::decide` allows or denies, a denial becomes 403
//! 5. The repository applies the change and the event goes to the team room

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Persistence layer
pub mod store;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Real-time update system
pub mod realtime;

/// Teams
pub mod teams;

/// Projects
pub mod projects;

/// Tasks
pub mod tasks;

/// Team chat
pub mod messages;

pub use error::BackendError;
pub use server::{create_app, AppState};
