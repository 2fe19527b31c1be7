//! MCP Tools Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server exposing utility tools over stdio.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use mcp_tools_server::config::Config;
use mcp_tools_server::error::Result;
use mcp_tools_server::mcp::registry::Registry;
use mcp_tools_server::mcp::server::{server_info, McpServer};
use mcp_tools_server::tools::build_registry;

/// MCP Tools Server
#[derive(Parser)]
#[command(name = "mcp-tools-server")]
#[command(author, version, about = "MCP Tools Server - A Model Context Protocol server with utility tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the registered tools, resources and prompts as JSON and exit
    ListTools,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new()?;
    let http = reqwest::Client::builder().build()?;
    let registry = match build_registry(&config, http, server_info()) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "failed to build registry");
            std::process::exit(1);
        }
    };

    let server = Arc::new(McpServer::new(registry));

    match cli.command {
        Some(Commands::ListTools) => {
            list_tools(server.registry())?;
        }
        None => {
            if !config.has_hf_token() {
                tracing::warn!("HF_TOKEN is not set; generate-image calls will likely fail");
            }
            run_server(server).await;
        }
    }

    Ok(())
}

fn list_tools(registry: &Registry) -> Result<()> {
    let listing = serde_json::json!({
        "tools": registry.tools(),
        "resources": registry.resources(),
        "prompts": registry.prompts(),
    });
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

async fn run_server(server: Arc<McpServer>) {
    tracing::info!("MCP server started on stdio");

    if let Err(e) = server.run_stdio().await {
        tracing::error!(error = %e, "transport failure");
        std::process::exit(1);
    }
}
