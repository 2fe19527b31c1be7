//! MCP Server implementation
//!
//! Line-delimited JSON-RPC over stdio. Each request runs in its own task so a
//! slow provider call never blocks the reader; responses are funnelled through
//! a single writer task so lines are never interleaved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{McpError, McpToolsError, Result};
use crate::mcp::registry::Registry;
use crate::mcp::types::*;

/// MCP Server info
pub const SERVER_NAME: &str = "mcp-tools-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capacity of the response queue between request tasks and the writer
const RESPONSE_QUEUE: usize = 64;

/// Identity reported in `initialize` and the `server://info` resource
pub fn server_info() -> ServerInfo {
    ServerInfo {
        name: SERVER_NAME.to_string(),
        version: SERVER_VERSION.to_string(),
    }
}

/// MCP Server over a fully built [`Registry`]
pub struct McpServer {
    /// Tools, resources and prompts, read-only after startup
    registry: Registry,

    /// Set once the client sends `notifications/initialized`
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            initialized: AtomicBool::new(false),
        }
    }

    /// Registered tools, resources and prompts
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Run the server on stdio until stdin closes
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    /// Returns after the reader reaches EOF and every in-flight request has
    /// been answered.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(RESPONSE_QUEUE);
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    if tx.send(response).await.is_err() {
                        tracing::warn!("response dropped: writer closed");
                    }
                }
            });
        }

        tracing::info!("input closed, draining in-flight requests");
        drop(tx);

        writer_task.await.map_err(|e| McpError::TransportError {
            message: e.to_string(),
        })?
    }

    /// Handle one incoming JSON-RPC message. `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        let fallback_id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    fallback_id,
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        tracing::debug!(method = %request.method, "handling request");
        let id = request.id.clone();
        Some(match self.handle_request(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => {
                self.initialized.store(true, Ordering::SeqCst);
                tracing::info!("client initialized");
            }
            other => tracing::debug!(method = %other, "ignoring notification"),
        }
    }

    async fn handle_request(
        &self,
        request: &JsonRpcRequest,
    ) -> std::result::Result<Value, JsonRpcError> {
        match request.method.as_str() {
            methods::INITIALIZE => to_result(self.handle_initialize()),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => to_result(ListToolsResult {
                tools: self.registry.tools(),
            }),
            methods::CALL_TOOL => {
                let params: CallToolParams = params(request)?;
                let result = self.registry.dispatch(&params.name, params.arguments).await?;
                to_result(result)
            }
            methods::LIST_RESOURCES => to_result(ListResourcesResult {
                resources: self.registry.resources(),
            }),
            methods::READ_RESOURCE => {
                let params: ReadResourceParams = params(request)?;
                match self.registry.read_resource(&params.uri).await {
                    Ok(result) => to_result(result),
                    Err(McpToolsError::Registry(e)) => Err(e.into()),
                    Err(e) => Err(JsonRpcError::internal_error(e.to_string())),
                }
            }
            methods::LIST_PROMPTS => to_result(ListPromptsResult {
                prompts: self.registry.prompts(),
            }),
            methods::GET_PROMPT => {
                let params: GetPromptParams = params(request)?;
                to_result(self.registry.get_prompt(&params.name, &params.arguments)?)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn handle_initialize(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: server_info(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                resources: Some(ResourcesCapability::default()),
                prompts: Some(PromptsCapability::default()),
            },
        }
    }
}

fn params<T: serde::de::DeserializeOwned>(
    request: &JsonRpcRequest,
) -> std::result::Result<T, JsonRpcError> {
    let params = request.params.clone().unwrap_or(Value::Null);
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_result<T: Serialize>(value: T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

async fn write_responses<W>(mut rx: mpsc::Receiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{duplex, AsyncReadExt};

    use super::*;
    use crate::tools::calculator::CalculatorTool;
    use crate::tools::code_review::CodeReviewPrompt;
    use crate::tools::greet::GreetTool;
    use crate::tools::server_info::ServerInfoResource;

    fn server() -> McpServer {
        let mut registry = Registry::new();
        registry.register_tool(GreetTool).unwrap();
        registry.register_tool(CalculatorTool).unwrap();
        registry
            .register_resource(Arc::new(ServerInfoResource::new(
                server_info(),
                registry.tools(),
            )))
            .unwrap();
        registry.register_prompt(Arc::new(CodeReviewPrompt)).unwrap();
        McpServer::new(registry)
    }

    async fn call(server: &McpServer, request: Value) -> JsonRpcResponse {
        server
            .handle_message(&request.to_string())
            .await
            .expect("request should get a response")
    }

    #[test]
    fn test_server_info() {
        assert_eq!(server_info().name, "mcp-tools-server");
    }

    #[tokio::test]
    async fn test_initialize_and_notification() {
        let server = server();
        let response = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-06-18");
        assert!(result["capabilities"]["prompts"].is_object());

        let none = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(none.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_listing_matches_registry() {
        let server = server();
        let response = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        )
        .await;

        let listed = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(listed, server.registry().tools().len());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = server().handle_message("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(&server(), json!({ "jsonrpc": "2.0", "id": "a", "method": "foo/bar" })).await;
        assert_eq!(response.error.unwrap().code, -32601);
        assert_eq!(response.id, Some(RequestId::String("a".to_string())));
    }

    #[tokio::test]
    async fn test_tools_call_success_and_unknown() {
        let server = server();
        let ok = call(
            &server,
            json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": { "name": "greet", "arguments": { "name": "Alice" } }
            }),
        )
        .await;
        let result = ok.result.unwrap();
        assert_eq!(result["content"][0]["text"], "Hey there, Alice! 👋 Nice to meet you!");

        let unknown = call(
            &server,
            json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": { "name": "nope", "arguments": {} }
            }),
        )
        .await;
        assert_eq!(unknown.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let response = call(
            &server(),
            json!({
                "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                "params": { "name": "calculator", "arguments": { "num1": 1, "operator": "+" } }
            }),
        )
        .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert_eq!(error.data.unwrap()["fields"], json!(["num2"]));
    }

    #[tokio::test]
    async fn test_resources_and_prompts() {
        let server = server();
        let listed = call(&server, json!({ "jsonrpc": "2.0", "id": 5, "method": "resources/list" })).await;
        assert_eq!(listed.result.unwrap()["resources"][0]["uri"], "server://info");

        let read = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 6, "method": "resources/read", "params": { "uri": "server://info" } }),
        )
        .await;
        assert_eq!(read.result.unwrap()["contents"][0]["mimeType"], "application/json");

        let missing = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 7, "method": "resources/read", "params": { "uri": "server://nope" } }),
        )
        .await;
        assert_eq!(missing.error.unwrap().code, -32602);

        let prompt = call(
            &server,
            json!({
                "jsonrpc": "2.0", "id": 8, "method": "prompts/get",
                "params": { "name": "code-review", "arguments": { "code": "x = 1" } }
            }),
        )
        .await;
        assert_eq!(prompt.result.unwrap()["messages"][0]["role"], "user");

        let no_code = call(
            &server,
            json!({ "jsonrpc": "2.0", "id": 9, "method": "prompts/get", "params": { "name": "code-review" } }),
        )
        .await;
        assert_eq!(no_code.error.unwrap().data.unwrap()["fields"], json!(["code"]));
    }

    #[tokio::test]
    async fn test_serve_over_duplex() {
        let server = Arc::new(server());
        let (mut client_tx, server_rx) = duplex(4096);
        let (server_tx, mut client_rx) = duplex(4096);

        let serving = tokio::spawn(server.serve(server_rx, server_tx));

        let input = [
            json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string(),
            String::new(),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string(),
        ]
        .join("\n")
            + "\n";
        client_tx.write_all(input.as_bytes()).await.unwrap();
        drop(client_tx);

        let mut output = String::new();
        client_rx.read_to_string(&mut output).await.unwrap();
        serving.await.unwrap().unwrap();

        let responses: Vec<JsonRpcResponse> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);

        let tools = responses
            .iter()
            .find(|r| r.id == Some(RequestId::Number(2)))
            .and_then(|r| r.result.clone())
            .unwrap();
        assert_eq!(tools["tools"].as_array().unwrap().len(), 2);
    }
}
