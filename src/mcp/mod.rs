//! MCP (Model Context Protocol) module
//!
//! Protocol types, the tool/resource/prompt registry and the stdio server.

pub mod registry;
pub mod server;
pub mod types;
