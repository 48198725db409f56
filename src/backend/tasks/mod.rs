//! Tasks Module
//!
//! Tasks live inside projects and take their team from the project.
//! ADMINs and MANAGERs create and edit them, only MANAGERs assign them,
//! the assigned MEMBER moves their status, and only ADMINs delete them.
//! Every change is published to the team room.
//!
//! - **`commands`** - List, create, update and delete
//! - **`handlers`** - HTTP handlers

pub mod commands;
pub mod handlers;
