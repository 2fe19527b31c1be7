//! Nominatim geocoding client

use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::error::ProviderError;
use crate::providers::types::Place;

/// Client for the Nominatim search endpoint
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http_client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(http_client: reqwest::Client, base_url: &str, user_agent: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Look up the best match for an address. `None` when nothing matched.
    pub async fn search(&self, address: &str) -> Result<Option<Place>, ProviderError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestFailed {
                status: response.status(),
            });
        }

        let data: Value = response.json().await?;
        let Some(first) = data.as_array().and_then(|hits| hits.first()) else {
            return Ok(None);
        };

        serde_json::from_value(first.clone())
            .map(Some)
            .map_err(|e| ProviderError::UnexpectedResponse {
                message: e.to_string(),
            })
    }
}
