//! Teams Module
//!
//! - **`commands`** - Team creation on top of the repository
//! - **`handlers`** - HTTP handlers

pub mod commands;
pub mod handlers;
