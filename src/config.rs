//! Configuration management for the MCP tools server
//!
//! Handles environment variables and provider endpoints.

use reqwest::Url;

use crate::error::{ConfigError, McpToolsError, Result};

/// Configuration for the MCP tools server
#[derive(Debug, Clone)]
pub struct Config {
    /// Hugging Face access token, passed to the inference provider as-is
    pub hf_token: Option<String>,

    /// Base URL of the Nominatim geocoding service
    pub geocoder_base_url: String,

    /// Base URL of the Open-Meteo forecast service
    pub forecast_base_url: String,

    /// Base URL of the Hugging Face inference router
    pub inference_base_url: String,

    /// Base URL of the Hugging Face Hub, queried for inference provider mappings
    pub hub_base_url: String,

    /// Identifying User-Agent required by the geocoding service
    pub geocoder_user_agent: String,
}

impl Config {
    /// Create a new configuration from the environment
    pub fn new() -> Result<Self> {
        let hf_token = std::env::var("HF_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            hf_token,
            geocoder_base_url: Self::base_url_from_env(
                "GEOCODER_BASE_URL",
                providers::GEOCODER_BASE_URL,
            )?,
            forecast_base_url: Self::base_url_from_env(
                "FORECAST_BASE_URL",
                providers::FORECAST_BASE_URL,
            )?,
            inference_base_url: Self::base_url_from_env(
                "INFERENCE_BASE_URL",
                providers::INFERENCE_BASE_URL,
            )?,
            hub_base_url: Self::base_url_from_env("HF_HUB_BASE_URL", providers::HUB_BASE_URL)?,
            geocoder_user_agent: std::env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| providers::GEOCODER_USER_AGENT.to_string()),
        })
    }

    /// Read a base URL override, falling back to the default
    fn base_url_from_env(var: &str, default: &str) -> Result<String> {
        let value = std::env::var(var).unwrap_or_else(|_| default.to_string());

        Url::parse(&value).map_err(|e| {
            McpToolsError::Config(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                message: e.to_string(),
            })
        })?;

        Ok(value.trim_end_matches('/').to_string())
    }

    /// Whether an inference credential was provided
    pub fn has_hf_token(&self) -> bool {
        self.hf_token.is_some()
    }
}

/// Provider constants
pub mod providers {
    /// Nominatim (OpenStreetMap) geocoder
    pub const GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";

    /// Nominatim's usage policy requires an identifying User-Agent
    pub const GEOCODER_USER_AGENT: &str = "MCP-Geocode-Tool/1.0";

    /// Open-Meteo forecast API
    pub const FORECAST_BASE_URL: &str = "https://api.open-meteo.com";

    /// Hugging Face inference router
    pub const INFERENCE_BASE_URL: &str = "https://router.huggingface.co";

    /// Hugging Face Hub API
    pub const HUB_BASE_URL: &str = "https://huggingface.co";

    /// Text-to-image model
    pub const IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell";

    /// Low step count keeps generation fast
    pub const IMAGE_INFERENCE_STEPS: u32 = 5;

    pub const HOURLY_FIELDS: &str =
        "temperature_2m,relative_humidity_2m,precipitation,weather_code,wind_speed_10m";

    pub const DAILY_FIELDS: &str =
        "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code";
}
