//! Error types for the MCP tools server
//!
//! Two channels are kept apart: [`RegistryError`] is structural and becomes a
//! JSON-RPC error object, [`ToolError`] is local to a handler and becomes
//! envelope content according to the tool's failure policy.

use thiserror::Error;

/// Main error type for the MCP tools server
#[derive(Error, Debug)]
pub enum McpToolsError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Registry and dispatch errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// External provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidEnvVar { var: String, message: String },
}

/// Registry errors, surfaced before any handler runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("{kind} already registered: {name}")]
    DuplicateName { kind: EntryKind, name: String },

    #[error("Invalid input schema for {name}: {message}")]
    InvalidSchema { name: String, message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Unknown resource: {uri}")]
    UnknownResource { uri: String },

    #[error("Unknown prompt: {name}")]
    UnknownPrompt { name: String },

    #[error("Invalid arguments for {name} ({}): {message}", .fields.join(", "))]
    Validation {
        name: String,
        fields: Vec<String>,
        message: String,
    },
}

/// Registry namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Tool,
    Resource,
    Prompt,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Tool => write!(f, "Tool"),
            EntryKind::Resource => write!(f, "Resource"),
            EntryKind::Prompt => write!(f, "Prompt"),
        }
    }
}

/// External provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API 요청 실패: {status}")]
    RequestFailed { status: reqwest::StatusCode },

    #[error("{reason}")]
    Api { reason: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// Failures local to a tool handler
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("0으로 나눌 수 없습니다.")]
    DivisionByZero,

    #[error("Invalid time zone specified: {zone}")]
    InvalidTimezone { zone: String },

    #[error("Invalid image data: {message}")]
    ImageDecode { message: String },

    #[error("{0}")]
    Provider(#[from] ProviderError),
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, McpToolsError>;
