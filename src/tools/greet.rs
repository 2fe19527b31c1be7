//! `greet` tool

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FailurePolicy, Tool};
use crate::error::ToolError;
use crate::mcp::types::{text_output_schema, CallToolResult};

/// Greeting language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    #[default]
    En,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GreetArgs {
    /// Name of the person to greet
    #[schemars(length(min = 1))]
    pub name: String,

    /// Greeting language (default: en)
    #[serde(default)]
    pub language: Language,
}

pub fn greeting(name: &str, language: Language) -> String {
    match language {
        Language::Ko => format!("안녕하세요, {}님!", name),
        Language::En => format!("Hey there, {}! 👋 Nice to meet you!", name),
    }
}

pub struct GreetTool;

#[async_trait]
impl Tool for GreetTool {
    type Args = GreetArgs;

    const NAME: &'static str = "greet";
    const DESCRIPTION: &'static str = "Returns a greeting for the given name and language.";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::ReportAsText;

    fn output_schema(&self) -> Option<Value> {
        Some(text_output_schema("Greeting"))
    }

    async fn call(&self, args: GreetArgs) -> Result<CallToolResult, ToolError> {
        let text = greeting(&args.name, args.language);
        Ok(CallToolResult::structured_text(text.clone(), text))
    }
}
