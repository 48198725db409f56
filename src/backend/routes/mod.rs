//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation, CORS, tracing and fallback
//! - **`api_routes`** - Public and protected `/api` endpoints
//!
//! # Route Organization
//!
//! 1. **Root** - `GET /` API index, `GET /ws` realtime socket
//! 2. **Public API** - register, login, health
//! 3. **Protected API** - profile, teams, projects, tasks, messages
//! 4. **Fallback** - `404 {"success": false, "message": "Route not found"}`

/// Main router creation
pub mod router;

/// API endpoint wiring
pub mod api_routes;

pub use router::create_router;
