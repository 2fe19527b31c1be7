//! `geocode` tool

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{FailurePolicy, Tool};
use crate::error::{ProviderError, ToolError};
use crate::format::{geocode_not_found, geocode_not_found_short, geocode_report};
use crate::mcp::types::{text_output_schema, CallToolResult};
use crate::providers::NominatimClient;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GeocodeArgs {
    /// Address or place name to look up (e.g. "서울시청", "Eiffel Tower")
    pub address: String,
}

pub struct GeocodeTool {
    client: NominatimClient,
}

impl GeocodeTool {
    pub fn new(client: NominatimClient) -> Self {
        Self { client }
    }
}

fn coordinate(raw: &str) -> Result<f64, ToolError> {
    raw.trim().parse().map_err(|_| {
        ToolError::Provider(ProviderError::UnexpectedResponse {
            message: format!("invalid coordinate: {}", raw),
        })
    })
}

#[async_trait]
impl Tool for GeocodeTool {
    type Args = GeocodeArgs;

    const NAME: &'static str = "geocode";
    const DESCRIPTION: &'static str =
        "Looks up an address or place name and returns its latitude and longitude.";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::ReportAsText;

    fn output_schema(&self) -> Option<Value> {
        Some(text_output_schema("Geocoding result"))
    }

    async fn call(&self, args: GeocodeArgs) -> Result<CallToolResult, ToolError> {
        let Some(place) = self.client.search(&args.address).await? else {
            return Ok(CallToolResult::structured_text(
                geocode_not_found(&args.address),
                geocode_not_found_short(&args.address),
            ));
        };

        let latitude = coordinate(&place.lat)?;
        let longitude = coordinate(&place.lon)?;
        let display_name = place.display_name.as_deref().unwrap_or(&args.address);

        let text = geocode_report(display_name, latitude, longitude);
        Ok(CallToolResult::structured_text(text.clone(), text))
    }
}
