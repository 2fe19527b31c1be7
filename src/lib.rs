//! MCP Tools Server Library
//!
//! A Model Context Protocol (MCP) server exposing a small set of utility
//! tools: greeting, arithmetic, world clock, geocoding, weather forecasts and
//! text-to-image generation, plus a server info resource and a code review
//! prompt.

pub mod config;
pub mod error;
pub mod format;
pub mod lookup;
pub mod mcp;
pub mod providers;
pub mod tools;

pub use config::Config;
pub use error::{McpToolsError, Result};
