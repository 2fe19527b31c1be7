//! `get-weather` tool

use async_trait::async_trait;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, NumberValidation, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{FailurePolicy, Tool};
use crate::error::{ProviderError, ToolError};
use crate::format::weather_report;
use crate::mcp::types::{text_output_schema, CallToolResult};
use crate::providers::OpenMeteoClient;

fn default_forecast_days() -> u32 {
    7
}

/// Whole day count, also when written as a float (`7.0`)
fn whole_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let days = f64::deserialize(deserializer)?;
    if days.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&days) {
        Ok(days as u32)
    } else {
        Err(D::Error::custom(format!("expected a whole number of days, got {days}")))
    }
}

fn bounded_number(minimum: f64, maximum: f64) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::Number.into()),
        number: Some(Box::new(NumberValidation {
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

fn latitude_schema(_: &mut SchemaGenerator) -> Schema {
    bounded_number(-90.0, 90.0)
}

fn longitude_schema(_: &mut SchemaGenerator) -> Schema {
    bounded_number(-180.0, 180.0)
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// Latitude in decimal degrees
    #[schemars(schema_with = "latitude_schema")]
    pub latitude: f64,

    /// Longitude in decimal degrees
    #[schemars(schema_with = "longitude_schema")]
    pub longitude: f64,

    /// Number of forecast days (1-16, default: 7)
    #[serde(default = "default_forecast_days", deserialize_with = "whole_days")]
    #[schemars(range(min = 1, max = 16))]
    pub forecast_days: u32,
}

pub struct WeatherTool {
    client: OpenMeteoClient,
}

impl WeatherTool {
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    type Args = WeatherArgs;

    const NAME: &'static str = "get-weather";
    const DESCRIPTION: &'static str =
        "Returns current conditions and a daily forecast for a latitude/longitude.";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::ReportAsText;

    fn output_schema(&self) -> Option<Value> {
        Some(text_output_schema("Weather report"))
    }

    async fn call(&self, args: WeatherArgs) -> Result<CallToolResult, ToolError> {
        let forecast = self
            .client
            .forecast(args.latitude, args.longitude, args.forecast_days)
            .await?;

        let current = forecast
            .current()
            .ok_or_else(|| ProviderError::UnexpectedResponse {
                message: "forecast has no hourly samples".to_string(),
            })?;
        let days = forecast.daily_summaries(args.forecast_days as usize);
        let timezone = forecast.timezone.as_deref().unwrap_or("-");

        let text = weather_report(
            &current,
            &days,
            args.forecast_days,
            args.latitude,
            args.longitude,
            timezone,
        );
        Ok(CallToolResult::structured_text(text.clone(), text))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;
    use crate::mcp::registry::ToolHandler;
    use crate::tools::{TypedTool, ERROR_MARKER};

    fn tool(server: &MockServer) -> WeatherTool {
        WeatherTool::new(OpenMeteoClient::new(reqwest::Client::new(), &server.base_url()))
    }

    fn forecast_body(days: usize) -> Value {
        let dates: Vec<String> = (1..=days).map(|d| format!("2025-01-{:02}", d)).collect();
        json!({
            "timezone": "Asia/Seoul",
            "hourly": {
                "time": ["2025-01-01T00:00", "2025-01-01T01:00"],
                "temperature_2m": [1.5, 1.0],
                "relative_humidity_2m": [70, 71],
                "precipitation": [0.0, 0.0],
                "weather_code": [3, 3],
                "wind_speed_10m": [5.4, 5.0]
            },
            "daily": {
                "time": dates,
                "temperature_2m_max": vec![4.0; days],
                "temperature_2m_min": vec![-1.0; days],
                "precipitation_sum": vec![0.0; days],
                "weather_code": vec![61; days]
            }
        })
    }

    #[tokio::test]
    async fn test_report() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/forecast")
                .query_param("forecast_days", "2");
            then.status(200).json_body(forecast_body(2));
        });

        let result = tool(&server)
            .call(WeatherArgs {
                latitude: 37.5,
                longitude: 127.0,
                forecast_days: 2,
            })
            .await
            .unwrap();
        let text = result.text_content();

        assert!(text.starts_with("🌤️ 현재 날씨 (2025-01-01T00:00)"));
        assert!(text.contains("🌡️ 온도: 1.5°C"));
        assert!(text.contains("☁️ 날씨: 흐림"));
        assert_eq!(text.matches("📅").count(), 2);
        assert!(text.ends_with("🌍 시간대: Asia/Seoul"));
    }

    #[tokio::test]
    async fn test_daily_entries_capped_at_requested_days() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200).json_body(forecast_body(5));
        });

        let result = tool(&server)
            .call(WeatherArgs {
                latitude: 0.0,
                longitude: 0.0,
                forecast_days: 3,
            })
            .await
            .unwrap();
        assert_eq!(result.text_content().matches("📅").count(), 3);
    }

    #[tokio::test]
    async fn test_header_counts_requested_days() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200).json_body(forecast_body(3));
        });

        let text = tool(&server)
            .call(WeatherArgs {
                latitude: 0.0,
                longitude: 0.0,
                forecast_days: 7,
            })
            .await
            .unwrap()
            .text_content();

        assert!(text.contains("📊 7일 예보"));
        assert_eq!(text.matches("📅").count(), 3);
    }

    #[tokio::test]
    async fn test_float_day_count_accepted() {
        let server = MockServer::start();
        let forecast = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/forecast")
                .query_param("forecast_days", "7");
            then.status(200).json_body(forecast_body(7));
        });

        let result = TypedTool::new(tool(&server))
            .invoke(json!({ "latitude": 1.0, "longitude": 2.0, "forecast_days": 7.0 }))
            .await
            .unwrap();

        forecast.assert();
        assert!(result.text_content().contains("📊 7일 예보"));
    }

    #[test]
    fn test_fractional_day_count_rejected() {
        let parsed = serde_json::from_value::<WeatherArgs>(
            json!({ "latitude": 1.0, "longitude": 2.0, "forecast_days": 2.5 }),
        );
        assert!(parsed.is_err());

        let defaulted: WeatherArgs =
            serde_json::from_value(json!({ "latitude": 1.0, "longitude": 2.0 })).unwrap();
        assert_eq!(defaulted.forecast_days, 7);
    }

    #[tokio::test]
    async fn test_api_error_reason_is_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200).json_body(json!({ "error": true }));
        });

        let result = TypedTool::new(tool(&server))
            .invoke(json!({ "latitude": 1.0, "longitude": 2.0, "forecast_days": 7 }))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert_eq!(
            result.text_content(),
            format!("{}알 수 없는 오류가 발생했습니다.", ERROR_MARKER)
        );
    }

    #[test]
    fn test_schema_bounds() {
        let schema = WeatherTool::new(OpenMeteoClient::new(reqwest::Client::new(), "http://x"))
            .descriptor()
            .input_schema;
        assert_eq!(schema["properties"]["latitude"]["minimum"], -90.0);
        assert_eq!(schema["properties"]["longitude"]["maximum"], 180.0);
        assert_eq!(schema["properties"]["forecast_days"]["default"], 7);
        assert_eq!(schema["required"], json!(["latitude", "longitude"]));
    }
}
