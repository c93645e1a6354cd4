//! MCP server
//!
//! rmcp service definition and tool routing.

mod server;

pub use server::NutrackService;
