//! MCP tool implementations
//!
//! Tool-layer functions over the database, one module per feature area.

pub mod chat;
pub mod days;
pub mod food_items;
pub mod profile;
pub mod progress;
pub mod reminders;
pub mod reports;
pub mod scanner;
pub mod share;
pub mod status;
