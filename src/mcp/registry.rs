//! Tool, resource and prompt registry
//!
//! Built once at startup and shared read-only afterwards. Dispatch is purely
//! structural: look the entry up, validate the arguments against the declared
//! JSON Schema, fill in schema defaults, hand over to the handler.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use serde_json::{Map, Value};

use crate::error::{EntryKind, RegistryError, Result};
use crate::mcp::types::{
    CallToolResult, GetPromptResult, PromptDescriptor, ReadResourceResult, ResourceDescriptor,
    ToolDescriptor,
};
use crate::tools::{Tool, TypedTool};

/// Type-erased tool handler
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with arguments that already passed schema validation
    async fn invoke(&self, arguments: Value) -> std::result::Result<CallToolResult, RegistryError>;
}

/// A URI-addressable, read-only resource
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    fn descriptor(&self) -> ResourceDescriptor;

    async fn read(&self) -> Result<ReadResourceResult>;
}

/// A named message template
pub trait PromptProvider: Send + Sync {
    fn descriptor(&self) -> PromptDescriptor;

    /// Render the template. Required arguments are checked by the registry.
    fn render(&self, arguments: &HashMap<String, String>) -> GetPromptResult;
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    validator: JSONSchema,
    handler: Arc<dyn ToolHandler>,
}

/// Registry of everything the server exposes
#[derive(Default)]
pub struct Registry {
    tools: Vec<RegisteredTool>,
    tool_index: HashMap<String, usize>,
    resources: Vec<Arc<dyn ResourceProvider>>,
    resource_index: HashMap<String, usize>,
    prompts: Vec<Arc<dyn PromptProvider>>,
    prompt_index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Registration ====================

    /// Register a tool under its descriptor's name
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> std::result::Result<(), RegistryError> {
        if self.tool_index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateName {
                kind: EntryKind::Tool,
                name: descriptor.name,
            });
        }

        let validator = JSONSchema::compile(&descriptor.input_schema).map_err(|e| {
            RegistryError::InvalidSchema {
                name: descriptor.name.clone(),
                message: e.to_string(),
            }
        })?;

        tracing::debug!(tool = %descriptor.name, "registered tool");
        self.tool_index
            .insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            validator,
            handler,
        });
        Ok(())
    }

    /// Register a typed tool, deriving its descriptor
    pub fn register_tool<T: Tool>(&mut self, tool: T) -> std::result::Result<(), RegistryError> {
        let descriptor = tool.descriptor();
        self.register(descriptor, Arc::new(TypedTool::new(tool)))
    }

    /// Register a resource under its URI
    pub fn register_resource(
        &mut self,
        provider: Arc<dyn ResourceProvider>,
    ) -> std::result::Result<(), RegistryError> {
        let uri = provider.descriptor().uri;
        if self.resource_index.contains_key(&uri) {
            return Err(RegistryError::DuplicateName {
                kind: EntryKind::Resource,
                name: uri,
            });
        }

        tracing::debug!(resource = %uri, "registered resource");
        self.resource_index.insert(uri, self.resources.len());
        self.resources.push(provider);
        Ok(())
    }

    /// Register a prompt under its name
    pub fn register_prompt(
        &mut self,
        provider: Arc<dyn PromptProvider>,
    ) -> std::result::Result<(), RegistryError> {
        let name = provider.descriptor().name;
        if self.prompt_index.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: EntryKind::Prompt,
                name,
            });
        }

        tracing::debug!(prompt = %name, "registered prompt");
        self.prompt_index.insert(name, self.prompts.len());
        self.prompts.push(provider);
        Ok(())
    }

    // ==================== Listing ====================

    /// Tool descriptors in registration order
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Resource descriptors in registration order
    pub fn resources(&self) -> Vec<ResourceDescriptor> {
        self.resources.iter().map(|r| r.descriptor()).collect()
    }

    /// Prompt descriptors in registration order
    pub fn prompts(&self) -> Vec<PromptDescriptor> {
        self.prompts.iter().map(|p| p.descriptor()).collect()
    }

    // ==================== Dispatch ====================

    /// Validate and route a tool invocation
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
    ) -> std::result::Result<CallToolResult, RegistryError> {
        let tool = self
            .tool_index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::UnknownTool {
                name: name.to_string(),
            })?;

        let mut arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        validate_arguments(&tool.descriptor.name, &tool.validator, &arguments)?;
        apply_defaults(&tool.descriptor.input_schema, &mut arguments);

        tracing::debug!(tool = %name, "dispatching tool call");
        tool.handler.invoke(arguments).await
    }

    /// Read a resource by URI
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        let provider = self
            .resource_index
            .get(uri)
            .map(|&i| &self.resources[i])
            .ok_or_else(|| RegistryError::UnknownResource {
                uri: uri.to_string(),
            })?;

        provider.read().await
    }

    /// Resolve a prompt by name
    pub fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> std::result::Result<GetPromptResult, RegistryError> {
        let provider = self
            .prompt_index
            .get(name)
            .map(|&i| &self.prompts[i])
            .ok_or_else(|| RegistryError::UnknownPrompt {
                name: name.to_string(),
            })?;

        let missing: Vec<String> = provider
            .descriptor()
            .arguments
            .into_iter()
            .filter(|arg| arg.required && !arguments.contains_key(&arg.name))
            .map(|arg| arg.name)
            .collect();

        if !missing.is_empty() {
            return Err(RegistryError::Validation {
                name: name.to_string(),
                message: format!("missing required arguments: {}", missing.join(", ")),
                fields: missing,
            });
        }

        Ok(provider.render(arguments))
    }
}

/// Check arguments against a compiled schema, collecting every offending field
fn validate_arguments(
    name: &str,
    validator: &JSONSchema,
    arguments: &Value,
) -> std::result::Result<(), RegistryError> {
    let errors = match validator.validate(arguments) {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };

    let mut fields: Vec<String> = Vec::new();
    let mut messages = Vec::new();

    for error in errors {
        let field = match &error.kind {
            ValidationErrorKind::Required { property } => property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string()),
            _ => error
                .instance_path
                .to_string()
                .trim_start_matches('/')
                .to_string(),
        };
        let field = if field.is_empty() {
            "arguments".to_string()
        } else {
            field
        };

        messages.push(error.to_string());
        if !fields.contains(&field) {
            fields.push(field);
        }
    }

    Err(RegistryError::Validation {
        name: name.to_string(),
        fields,
        message: messages.join("; "),
    })
}

/// Fill absent top-level properties with their schema defaults
fn apply_defaults(schema: &Value, arguments: &mut Value) {
    let (Some(properties), Some(args)) = (
        schema.get("properties").and_then(Value::as_object),
        arguments.as_object_mut(),
    ) else {
        return;
    };

    for (key, property) in properties {
        if let Some(default) = property.get("default") {
            args.entry(key.clone()).or_insert_with(|| default.clone());
        }
    }
}
