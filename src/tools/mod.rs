//! Tool, resource and prompt implementations
//!
//! Every tool implements [`Tool`] with a typed argument struct. The input
//! schema is derived from that struct, the registry validates against it, and
//! [`TypedTool`] turns handler failures into envelopes according to the
//! tool's [`FailurePolicy`].

pub mod calculator;
pub mod code_review;
pub mod geocode;
pub mod greet;
pub mod image;
pub mod server_info;
pub mod timezone;
pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{RegistryError, Result, ToolError};
use crate::mcp::registry::{Registry, ToolHandler};
use crate::mcp::types::{CallToolResult, ServerInfo, ToolDescriptor};
use crate::providers::geocoding::NominatimClient;
use crate::providers::inference::HuggingFaceClient;
use crate::providers::weather::OpenMeteoClient;

/// Prefix marking a failure reported as ordinary text
pub const ERROR_MARKER: &str = "오류: ";

/// How a tool reports its own failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Successful envelope whose text starts with [`ERROR_MARKER`]
    ReportAsText,
    /// Envelope with `isError` set
    FlagError {
        prefix: &'static str,
        hint: &'static str,
    },
}

impl FailurePolicy {
    /// Render a handler failure as an envelope
    pub fn render(&self, error: &ToolError) -> CallToolResult {
        match self {
            FailurePolicy::ReportAsText => {
                let text = format!("{}{}", ERROR_MARKER, error);
                CallToolResult::structured_text(text.clone(), text)
            }
            FailurePolicy::FlagError { prefix, hint } => {
                CallToolResult::error(format!("{}{}\n\n{}", prefix, error, hint))
            }
        }
    }
}

/// A schema-validated callable exposed to the host
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Arguments after validation and defaulting
    type Args: DeserializeOwned + JsonSchema + Send;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    const FAILURE_POLICY: FailurePolicy;

    /// Schema of `structuredContent`, for tools that return it
    fn output_schema(&self) -> Option<Value> {
        None
    }

    async fn call(&self, args: Self::Args) -> std::result::Result<CallToolResult, ToolError>;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            input_schema: input_schema_for::<Self::Args>(),
            output_schema: self.output_schema(),
        }
    }
}

/// Adapter from a typed [`Tool`] to the registry's [`ToolHandler`]
pub struct TypedTool<T> {
    tool: T,
}

impl<T: Tool> TypedTool<T> {
    pub fn new(tool: T) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl<T: Tool> ToolHandler for TypedTool<T> {
    async fn invoke(&self, arguments: Value) -> std::result::Result<CallToolResult, RegistryError> {
        let args: T::Args =
            serde_json::from_value(arguments).map_err(|e| RegistryError::Validation {
                name: T::NAME.to_string(),
                fields: Vec::new(),
                message: e.to_string(),
            })?;

        match self.tool.call(args).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(tool = T::NAME, error = %e, "tool call failed");
                Ok(T::FAILURE_POLICY.render(&e))
            }
        }
    }
}

/// JSON Schema for an argument struct, inlined and without draft metadata
pub fn input_schema_for<A: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.option_add_null_type = false;
        })
        .into_generator();

    let mut schema = serde_json::to_value(generator.into_root_schema_for::<A>())
        .unwrap_or_else(|_| json!({ "type": "object" }));

    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.remove("definitions");
    }
    schema
}

/// Build the registry with every tool, resource and prompt the server exposes
pub fn build_registry(
    config: &Config,
    http: reqwest::Client,
    server: ServerInfo,
) -> Result<Registry> {
    let mut registry = Registry::new();

    registry.register_tool(greet::GreetTool)?;
    registry.register_tool(calculator::CalculatorTool)?;
    registry.register_tool(timezone::TimezoneTool)?;
    registry.register_tool(geocode::GeocodeTool::new(NominatimClient::new(
        http.clone(),
        &config.geocoder_base_url,
        &config.geocoder_user_agent,
    )))?;
    registry.register_tool(weather::WeatherTool::new(OpenMeteoClient::new(
        http.clone(),
        &config.forecast_base_url,
    )))?;

    let generator = HuggingFaceClient::new(
        http.clone(),
        &config.inference_base_url,
        &config.hub_base_url,
        config.hf_token.clone(),
    );
    registry.register_tool(image::GenerateImageTool::new(Arc::new(generator), http))?;

    let server_info = server_info::ServerInfoResource::new(server, registry.tools());
    registry.register_resource(Arc::new(server_info))?;
    registry.register_prompt(Arc::new(code_review::CodeReviewPrompt))?;

    tracing::info!(
        tools = registry.tools().len(),
        resources = registry.resources().len(),
        prompts = registry.prompts().len(),
        "registry built"
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct SampleArgs {
        /// Required text
        #[schemars(length(min = 1))]
        text: String,
        /// Optional count
        #[serde(default = "default_count")]
        #[schemars(range(min = 1, max = 16))]
        count: u32,
        note: Option<String>,
    }

    fn default_count() -> u32 {
        7
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        type Args = SampleArgs;
        const NAME: &'static str = "failing";
        const DESCRIPTION: &'static str = "always fails";
        const FAILURE_POLICY: FailurePolicy = FailurePolicy::ReportAsText;

        async fn call(&self, _args: SampleArgs) -> std::result::Result<CallToolResult, ToolError> {
            Err(ToolError::DivisionByZero)
        }
    }

    #[test]
    fn test_schema_shape() {
        let schema = input_schema_for::<SampleArgs>();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["required"], json!(["text"]));
        assert_eq!(schema["properties"]["text"]["minLength"], 1);
        assert_eq!(schema["properties"]["count"]["default"], 7);
        assert_eq!(schema["properties"]["count"]["maximum"], 16.0);
        assert_eq!(schema["properties"]["note"]["type"], "string");
    }

    #[test]
    fn test_report_as_text_policy() {
        let result = FailurePolicy::ReportAsText.render(&ToolError::DivisionByZero);
        assert!(!result.is_error);
        assert!(result.text_content().starts_with(ERROR_MARKER));
        assert!(result.structured_content.is_some());
    }

    #[test]
    fn test_flag_error_policy() {
        let policy = FailurePolicy::FlagError {
            prefix: "failed: ",
            hint: "check config",
        };
        let result = policy.render(&ToolError::DivisionByZero);
        assert!(result.is_error);
        assert!(result.text_content().ends_with("check config"));
    }

    #[tokio::test]
    async fn test_typed_tool_applies_policy() {
        let handler = TypedTool::new(Failing);
        let result = handler
            .invoke(json!({ "text": "x", "count": 3 }))
            .await
            .unwrap();
        assert!(!result.is_error);
        assert!(result.text_content().contains("0으로 나눌 수 없습니다."));
    }

    #[tokio::test]
    async fn test_build_registry_exposes_everything() {
        let config = Config::new().unwrap();
        let registry = build_registry(
            &config,
            reqwest::Client::new(),
            ServerInfo {
                name: "test".to_string(),
                version: "0.0.0".to_string(),
            },
        )
        .unwrap();

        let names: Vec<String> = registry.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["greet", "calculator", "timezone", "geocode", "get-weather", "generate-image"]
        );
        assert_eq!(registry.resources()[0].uri, "server://info");
        assert_eq!(registry.prompts()[0].name, "code-review");
    }
}
