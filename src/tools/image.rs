//! `generate-image` tool
//!
//! Each [`InferenceOutput`] shape has exactly one conversion to an
//! [`ImagePayload`]. Unlike the other tools, failures are flagged with
//! `isError`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{FailurePolicy, Tool};
use crate::error::{ProviderError, ToolError};
use crate::mcp::types::CallToolResult;
use crate::providers::{ImageGenerator, InferenceOutput};

const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateImageArgs {
    /// Text description of the image to generate (English works best)
    pub prompt: String,
}

/// Base64 image data ready for an image content item
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

fn mime_or_default(content_type: Option<&str>) -> String {
    content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}

fn decode_error(message: impl Into<String>) -> ToolError {
    ToolError::ImageDecode {
        message: message.into(),
    }
}

/// Decode base64 text, accepting standard and URL-safe alphabets
fn decode_base64(text: &str) -> Result<Vec<u8>, ToolError> {
    let text = text.trim();
    STANDARD
        .decode(text)
        .or_else(|_| URL_SAFE.decode(text))
        .or_else(|_| URL_SAFE_NO_PAD.decode(text))
        .map_err(|e| decode_error(e.to_string()))
}

fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Result<ImagePayload, ToolError> {
    if bytes.is_empty() {
        return Err(decode_error("empty image"));
    }

    Ok(ImagePayload {
        data: STANDARD.encode(bytes),
        mime_type: mime_or_default(content_type),
    })
}

/// `data:image/png;base64,....`
fn from_data_url(url: &str) -> Result<ImagePayload, ToolError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| decode_error("not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| decode_error("data URL without payload"))?;

    let Some(media_type) = header.strip_suffix(";base64") else {
        return Err(decode_error("data URL is not base64 encoded"));
    };

    let bytes = decode_base64(payload)?;
    from_bytes(&bytes, Some(media_type))
}

pub struct GenerateImageTool {
    generator: Arc<dyn ImageGenerator>,
    http_client: reqwest::Client,
}

impl GenerateImageTool {
    pub fn new(generator: Arc<dyn ImageGenerator>, http_client: reqwest::Client) -> Self {
        Self {
            generator,
            http_client,
        }
    }

    /// Convert any provider output to base64 image data
    pub async fn normalize(&self, output: InferenceOutput) -> Result<ImagePayload, ToolError> {
        match output {
            InferenceOutput::Blob {
                bytes,
                content_type,
            } => from_bytes(&bytes, content_type.as_deref()),
            InferenceOutput::Buffer(bytes) => from_bytes(&bytes, None),
            InferenceOutput::Url(url) if url.starts_with("data:") => from_data_url(&url),
            InferenceOutput::Url(url) => self.fetch(&url).await,
            InferenceOutput::Encoded(text) => {
                let bytes = decode_base64(&text)?;
                from_bytes(&bytes, None)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<ImagePayload, ToolError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(ProviderError::from)?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestFailed {
                status: response.status(),
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(ProviderError::from)?;

        from_bytes(&bytes, content_type.as_deref())
    }
}

#[async_trait]
impl Tool for GenerateImageTool {
    type Args = GenerateImageArgs;

    const NAME: &'static str = "generate-image";
    const DESCRIPTION: &'static str =
        "Generates an image from a text prompt using the FLUX.1-schnell model on Hugging Face.";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::FlagError {
        prefix: "이미지 생성 실패: ",
        hint: "HF_TOKEN 환경 변수가 설정되어 있는지 확인해주세요.",
    };

    async fn call(&self, args: GenerateImageArgs) -> Result<CallToolResult, ToolError> {
        let output = self.generator.text_to_image(&args.prompt).await?;
        let payload = self.normalize(output).await?;

        tracing::info!(mime_type = %payload.mime_type, len = payload.data.len(), "image generated");
        Ok(CallToolResult::image(payload.data, payload.mime_type))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;
    use crate::mcp::registry::ToolHandler;
    use crate::mcp::types::{Role, ToolResultContent};
    use crate::tools::TypedTool;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    struct FixedGenerator(Result<InferenceOutput, String>);

    #[async_trait]
    impl ImageGenerator for FixedGenerator {
        async fn text_to_image(&self, _prompt: &str) -> Result<InferenceOutput, ProviderError> {
            self.0
                .clone()
                .map_err(|reason| ProviderError::Api { reason })
        }
    }

    fn tool(output: Result<InferenceOutput, String>) -> GenerateImageTool {
        GenerateImageTool::new(Arc::new(FixedGenerator(output)), reqwest::Client::new())
    }

    async fn generate(output: InferenceOutput) -> CallToolResult {
        tool(Ok(output))
            .call(GenerateImageArgs {
                prompt: "a red circle".to_string(),
            })
            .await
            .unwrap()
    }

    fn image_item(result: &CallToolResult) -> (String, String) {
        match &result.content[0] {
            ToolResultContent::Image {
                data,
                mime_type,
                annotations,
            } => {
                let annotations = annotations.as_ref().unwrap();
                assert_eq!(annotations.audience, vec![Role::User]);
                assert_eq!(annotations.priority, 0.9);
                (data.clone(), mime_type.clone())
            }
            other => panic!("expected image content, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blob_output() {
        let result = generate(InferenceOutput::Blob {
            bytes: PNG_HEADER.to_vec(),
            content_type: Some("image/jpeg".to_string()),
        })
        .await;

        let (data, mime_type) = image_item(&result);
        assert_eq!(data, STANDARD.encode(PNG_HEADER));
        assert_eq!(mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_buffer_output_defaults_to_png() {
        let result = generate(InferenceOutput::Buffer(PNG_HEADER.to_vec())).await;
        let (data, mime_type) = image_item(&result);
        assert_eq!(data, STANDARD.encode(PNG_HEADER));
        assert_eq!(mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_encoded_output_is_reencoded() {
        let url_safe = URL_SAFE_NO_PAD.encode([0xFB, 0xFF, 0xFE]);
        let result = generate(InferenceOutput::Encoded(url_safe)).await;
        let (data, _) = image_item(&result);
        assert_eq!(data, STANDARD.encode([0xFB, 0xFF, 0xFE]));
    }

    #[tokio::test]
    async fn test_standard_base64_is_unchanged() {
        let encoded = STANDARD.encode(PNG_HEADER);
        let result = generate(InferenceOutput::Encoded(encoded.clone())).await;
        let (data, mime_type) = image_item(&result);
        assert_eq!(data, encoded);
        assert_eq!(mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_data_url_output() {
        let url = format!("data:image/webp;base64,{}", STANDARD.encode(PNG_HEADER));
        let result = generate(InferenceOutput::Url(url)).await;
        let (data, mime_type) = image_item(&result);
        assert_eq!(data, STANDARD.encode(PNG_HEADER));
        assert_eq!(mime_type, "image/webp");
    }

    #[tokio::test]
    async fn test_remote_url_output_is_fetched() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/img.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(PNG_HEADER);
        });

        let result = generate(InferenceOutput::Url(server.url("/img.png"))).await;

        mock.assert();
        let (data, mime_type) = image_item(&result);
        assert_eq!(data, STANDARD.encode(PNG_HEADER));
        assert_eq!(mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_invalid_base64_is_decode_error() {
        let err = tool(Ok(InferenceOutput::Encoded("not base64 !!".to_string())))
            .call(GenerateImageArgs {
                prompt: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ImageDecode { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_flags_error() {
        let result = TypedTool::new(tool(Err("Invalid credentials".to_string())))
            .invoke(json!({ "prompt": "a cat" }))
            .await
            .unwrap();

        assert!(result.is_error);
        assert_eq!(
            result.text_content(),
            "이미지 생성 실패: Invalid credentials\n\nHF_TOKEN 환경 변수가 설정되어 있는지 확인해주세요."
        );
    }

    #[test]
    fn test_mime_fallback() {
        assert_eq!(mime_or_default(Some("image/jpeg; charset=binary")), "image/jpeg");
        assert_eq!(mime_or_default(Some("application/octet-stream")), "image/png");
        assert_eq!(mime_or_default(None), "image/png");
    }
}
