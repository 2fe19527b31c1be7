//! Hugging Face text-to-image client
//!
//! Inference providers answer in several shapes: raw image bytes, a JSON
//! serialized byte buffer, a URL, or base64 text. [`InferenceOutput`] names
//! each shape so the caller converts every one explicitly.
//!
//! The provider is chosen automatically: the model's provider mapping is
//! fetched from the Hub once and the first supported entry wins. When the
//! lookup fails or lists nothing usable the request goes to `hf-inference`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::config::providers::{IMAGE_INFERENCE_STEPS, IMAGE_MODEL};
use crate::error::ProviderError;

const TEXT_TO_IMAGE_TASK: &str = "text-to-image";

#[derive(Debug, Clone, Serialize)]
pub struct TextToImageRequest {
    pub inputs: String,
    pub parameters: TextToImageParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextToImageParameters {
    pub num_inference_steps: u32,
}

impl TextToImageRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            inputs: prompt.to_string(),
            parameters: TextToImageParameters {
                num_inference_steps: IMAGE_INFERENCE_STEPS,
            },
        }
    }
}

/// One entry of a model's inference provider mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMapping {
    #[serde(default)]
    pub provider: String,
    pub provider_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
}

impl ProviderMapping {
    fn serves_text_to_image(&self) -> bool {
        self.task.as_deref().map_or(true, |t| t == TEXT_TO_IMAGE_TASK)
            && self.status.as_deref() != Some("error")
    }
}

/// Read `inferenceProviderMapping` from a Hub model response.
///
/// The Hub has served it both as a list of entries and as an object keyed
/// by provider name; entry order is kept either way.
pub fn mapped_providers(model_info: &Value) -> Vec<ProviderMapping> {
    match model_info.get("inferenceProviderMapping") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(provider, entry)| {
                let mut mapping: ProviderMapping = serde_json::from_value(entry.clone()).ok()?;
                mapping.provider = provider.clone();
                Some(mapping)
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Where and how a text-to-image request is sent on the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRoute {
    /// `{router}/hf-inference/models/{model}`
    HfInference,
    /// `{router}/fal-ai/{provider_id}`
    FalAi { provider_id: String },
    /// OpenAI-style `{router}/{provider}/v1/images/generations`
    ImagesApi {
        provider: String,
        provider_id: String,
    },
}

impl ProviderRoute {
    /// Route for a mapping entry, `None` for providers this client cannot talk to
    pub fn for_mapping(mapping: &ProviderMapping) -> Option<Self> {
        match mapping.provider.as_str() {
            "hf-inference" => Some(ProviderRoute::HfInference),
            "fal-ai" => Some(ProviderRoute::FalAi {
                provider_id: mapping.provider_id.clone(),
            }),
            "together" | "nebius" | "nscale" => Some(ProviderRoute::ImagesApi {
                provider: mapping.provider.clone(),
                provider_id: mapping.provider_id.clone(),
            }),
            _ => None,
        }
    }

    /// First usable route in mapping order
    pub fn first_supported(mappings: &[ProviderMapping]) -> Option<Self> {
        mappings
            .iter()
            .filter(|m| m.serves_text_to_image())
            .find_map(Self::for_mapping)
    }

    pub fn provider(&self) -> &str {
        match self {
            ProviderRoute::HfInference => "hf-inference",
            ProviderRoute::FalAi { .. } => "fal-ai",
            ProviderRoute::ImagesApi { provider, .. } => provider,
        }
    }
}

/// Every result shape a text-to-image provider may return
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutput {
    /// Raw bytes with the content type the provider declared
    Blob {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    /// Byte array serialized as JSON (`{"type":"Buffer","data":[..]}`)
    Buffer(Vec<u8>),
    /// Remote location of the image, `http(s):` or `data:`
    Url(String),
    /// Already base64 encoded image data
    Encoded(String),
}

impl InferenceOutput {
    /// Classify a bare string result
    pub fn classify_string(text: &str) -> Self {
        let text = text.trim();
        if text.starts_with("http") || text.starts_with("data:") {
            InferenceOutput::Url(text.to_string())
        } else {
            InferenceOutput::Encoded(text.to_string())
        }
    }

    /// Classify a JSON result
    pub fn from_json(value: &Value) -> Result<Self, ProviderError> {
        match value {
            Value::String(text) => Ok(Self::classify_string(text)),
            Value::Object(object) => {
                if object.get("type").and_then(Value::as_str) == Some("Buffer") {
                    return buffer_bytes(object.get("data")).map(InferenceOutput::Buffer);
                }

                if let Some(url) = object.get("url").and_then(Value::as_str) {
                    return Ok(InferenceOutput::Url(url.to_string()));
                }

                for key in ["b64_json", "image"] {
                    if let Some(text) = object.get(key).and_then(Value::as_str) {
                        return Ok(Self::classify_string(text));
                    }
                }

                for key in ["data", "images"] {
                    match object.get(key).and_then(Value::as_array) {
                        Some(items) if !items.is_empty() => return Self::from_json(&items[0]),
                        _ => {}
                    }
                }

                Err(unexpected("unrecognized image object"))
            }
            Value::Array(items) if !items.is_empty() => Self::from_json(&items[0]),
            _ => Err(unexpected("unrecognized image result")),
        }
    }
}

fn buffer_bytes(data: Option<&Value>) -> Result<Vec<u8>, ProviderError> {
    let items = data
        .and_then(Value::as_array)
        .ok_or_else(|| unexpected("buffer without data"))?;

    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| unexpected("buffer entry is not a byte"))
        })
        .collect()
}

fn unexpected(message: &str) -> ProviderError {
    ProviderError::UnexpectedResponse {
        message: message.to_string(),
    }
}

/// Anything able to turn a prompt into an image
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn text_to_image(&self, prompt: &str) -> Result<InferenceOutput, ProviderError>;
}

/// Client for the Hugging Face inference router
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    http_client: reqwest::Client,
    base_url: String,
    hub_url: String,
    token: Option<String>,
    model: String,
    route: OnceCell<ProviderRoute>,
}

impl HuggingFaceClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        hub_url: &str,
        token: Option<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            hub_url: hub_url.trim_end_matches('/').to_string(),
            token,
            model: IMAGE_MODEL.to_string(),
            route: OnceCell::new(),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Provider for the next request. A failed lookup is not cached.
    pub async fn route(&self) -> ProviderRoute {
        match self.route.get_or_try_init(|| self.lookup_route()).await {
            Ok(route) => route.clone(),
            Err(e) => {
                tracing::warn!(
                    model = %self.model,
                    error = %e,
                    "provider mapping lookup failed, using hf-inference"
                );
                ProviderRoute::HfInference
            }
        }
    }

    async fn lookup_route(&self) -> Result<ProviderRoute, ProviderError> {
        let url = format!("{}/api/models/{}", self.hub_url, self.model);
        let response = self
            .authorize(self.http_client.get(&url))
            .query(&[("expand[]", "inferenceProviderMapping")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestFailed {
                status: response.status(),
            });
        }

        let model_info: Value = response.json().await?;
        let mappings = mapped_providers(&model_info);
        let route = ProviderRoute::first_supported(&mappings).unwrap_or(ProviderRoute::HfInference);

        tracing::info!(
            model = %self.model,
            mapped = mappings.len(),
            provider = route.provider(),
            "inference provider selected"
        );
        Ok(route)
    }

    fn request_for(&self, route: &ProviderRoute, prompt: &str) -> reqwest::RequestBuilder {
        let request = match route {
            ProviderRoute::HfInference => self
                .http_client
                .post(format!("{}/hf-inference/models/{}", self.base_url, self.model))
                .json(&TextToImageRequest::new(prompt)),
            ProviderRoute::FalAi { provider_id } => self
                .http_client
                .post(format!("{}/fal-ai/{}", self.base_url, provider_id))
                .json(&json!({
                    "prompt": prompt,
                    "num_inference_steps": IMAGE_INFERENCE_STEPS,
                })),
            ProviderRoute::ImagesApi {
                provider,
                provider_id,
            } => self
                .http_client
                .post(format!("{}/{}/v1/images/generations", self.base_url, provider))
                .json(&json!({
                    "prompt": prompt,
                    "model": provider_id,
                    "response_format": "b64_json",
                })),
        };

        self.authorize(request)
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceClient {
    async fn text_to_image(&self, prompt: &str) -> Result<InferenceOutput, ProviderError> {
        let route = self.route().await;
        let response = self.request_for(&route, prompt).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        if !status.is_success() {
            let body: Option<Value> = response.json().await.ok();
            let reason = body
                .as_ref()
                .and_then(|b| b.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string);

            return Err(match reason {
                Some(reason) => ProviderError::Api { reason },
                None => ProviderError::RequestFailed { status },
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(
            model = %self.model,
            provider = route.provider(),
            content_type = content_type.as_deref().unwrap_or("-"),
            len = bytes.len(),
            "inference response received"
        );

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("application/json") => {
                let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                    ProviderError::UnexpectedResponse {
                        message: e.to_string(),
                    }
                })?;
                InferenceOutput::from_json(&value)
            }
            Some(ct) if ct.starts_with("text/") => Ok(InferenceOutput::classify_string(
                &String::from_utf8_lossy(&bytes),
            )),
            _ => Ok(InferenceOutput::Blob {
                bytes: bytes.to_vec(),
                content_type,
            }),
        }
    }
}
