//! Real-time Update Module
//!
//! This module pushes task and message events to connected clients grouped
//! in team rooms.
//!
//! # Architecture
//!
//! - **`broadcast`** - The `FanoutHub` connection table and team rooms
//! - **`subscription`** - The `GET /ws` WebSocket handler
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Connection table and room fan-out
//! └── subscription.rs - WebSocket handshake and frame handling
//! ```
//!
//! # Event Types
//!
//! - `task-updated` - Task created or updated (populated task)
//! - `task-deleted` - Task removed (`{id, projectId}`)
//! - `new-message` - Team chat message (populated message)
//! - `joined` / `left` / `error` - Replies to client room requests
//!
//! Delivery is best-effort: a socket whose writer has gone away is
//! skipped and later pruned, and a socket that stops draining its bounded
//! queue is evicted.

/// Connection table and team rooms
pub mod broadcast;

/// WebSocket handler
pub mod subscription;

pub use broadcast::{ConnectionId, FanoutHub};
pub use subscription::handle_socket_upgrade;
