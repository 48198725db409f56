//! Projects Module
//!
//! Projects belong to exactly one team. ADMINs and MANAGERs manage the
//! projects of their own team; every team member can list them.
//!
//! - **`commands`** - List, create, update and delete
//! - **`handlers`** - HTTP handlers

pub mod commands;
pub mod handlers;
