//! `server://info` resource

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::mcp::registry::ResourceProvider;
use crate::mcp::types::{
    ReadResourceResult, ResourceContent, ResourceDescriptor, ServerInfo, ToolDescriptor,
};

pub const URI: &str = "server://info";

/// Server identity plus a snapshot of the registered tools
pub struct ServerInfoResource {
    server: ServerInfo,
    tools: Vec<ToolDescriptor>,
}

impl ServerInfoResource {
    pub fn new(server: ServerInfo, tools: Vec<ToolDescriptor>) -> Self {
        Self { server, tools }
    }

    /// The JSON document served by [`ResourceProvider::read`]
    pub fn document(&self, timestamp: &str) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": parameters(&tool.input_schema),
                })
            })
            .collect();

        json!({
            "server": {
                "name": self.server.name,
                "version": self.server.version,
            },
            "tools": tools,
            "timestamp": timestamp,
        })
    }
}

/// Property schemas of an object schema, with `optional: true` on the ones
/// not listed in `required`
fn parameters(input_schema: &Value) -> Value {
    let required: Vec<&str> = input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut parameters = Map::new();
    if let Some(properties) = input_schema.get("properties").and_then(Value::as_object) {
        for (name, schema) in properties {
            let mut schema = schema.clone();
            if !required.contains(&name.as_str()) {
                if let Some(object) = schema.as_object_mut() {
                    object.insert("optional".to_string(), Value::Bool(true));
                }
            }
            parameters.insert(name.clone(), schema);
        }
    }
    Value::Object(parameters)
}

#[async_trait]
impl ResourceProvider for ServerInfoResource {
    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            uri: URI.to_string(),
            name: "server-info".to_string(),
            description: "Server identity and the list of available tools".to_string(),
            mime_type: "application/json".to_string(),
        }
    }

    async fn read(&self) -> Result<ReadResourceResult> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let text = serde_json::to_string_pretty(&self.document(&timestamp))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContent {
                uri: URI.to_string(),
                mime_type: Some("application/json".to_string()),
                text: Some(text),
            }],
        })
    }
}
