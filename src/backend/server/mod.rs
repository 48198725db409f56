//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Environment configuration and database loading
//! - **`init`** - Server initialization and app creation
//!
//! # State Management
//!
//! `AppState` is the central state container. It holds:
//! - The repository (PostgreSQL or in-memory) behind `Arc<dyn Repository>`
//! - The `FanoutHub` that owns every realtime connection
//! - The `TokenService` that signs and verifies session tokens
//! - The loaded `ServerConfig`
//!
//! Handlers extract only the part they need through `FromRef`.

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::{build_router_with_store, create_app};
pub use state::{AppState, SharedStore};
