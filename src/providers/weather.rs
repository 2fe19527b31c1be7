//! Open-Meteo forecast client

use crate::config::providers::{DAILY_FIELDS, HOURLY_FIELDS};
use crate::error::ProviderError;
use crate::providers::types::Forecast;

const UNKNOWN_ERROR: &str = "알 수 없는 오류가 발생했습니다.";

/// Client for the Open-Meteo `/v1/forecast` endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current hourly conditions and daily aggregates for a point
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        forecast_days: u32,
    ) -> Result<Forecast, ProviderError> {
        let url = format!("{}/v1/forecast", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("forecast_days", forecast_days.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestFailed {
                status: response.status(),
            });
        }

        let forecast: Forecast = response.json().await?;
        if forecast.error {
            return Err(ProviderError::Api {
                reason: forecast
                    .reason
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            });
        }

        Ok(forecast)
    }
}
