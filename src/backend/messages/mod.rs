//! Messages Module
//!
//! Team chat: members post to their own team and read its recent history.
//! New messages are pushed to the team room as `new-message` events.
//!
//! - **`commands`** - Send and list
//! - **`handlers`** - HTTP handlers

pub mod commands;
pub mod handlers;
