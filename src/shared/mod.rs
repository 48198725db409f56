//! Shared Module
//!
//! This module contains the platform-agnostic core of the application:
//! domain records, request payloads, the authorization engine and the
//! realtime event format. Nothing here performs I/O, so every rule can be
//! tested without a server or database.
//!
//! # Overview
//!
//! - **`model`** - Users, teams, projects, tasks, messages and populated views
//! - **`access`** - Role and team based access decisions
//! - **`visibility`** - Which tasks an identity may see
//! - **`requests`** - Request bodies, query strings and validation
//! - **`response`** - The JSON response envelope
//! - **`event`** - Realtime events pushed to team rooms
//! - **`error`** - Shared error types

/// Domain records and views
pub mod model;

/// Authorization engine
pub mod access;

/// Task visibility filter
pub mod visibility;

/// Request payloads and validation
pub mod requests;

/// Response envelope
pub mod response;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use access::{decide, Action, Decision, Identity};
pub use error::SharedError;
pub use event::{EventType, RealtimeEvent};
pub use model::{Message, Project, Role, Task, TaskStatus, Team, User};
pub use response::ApiResponse;
pub use visibility::visible_tasks;
