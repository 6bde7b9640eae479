//! Gemini REST client.
//!
//! Implements both generative backends against the `generateContent`
//! endpoint. Authentication uses the `x-goog-api-key` header.
//!
//! # Usage
//!
//! ```rust,no_run
//! use yester_core::client::GeminiClient;
//! use yester_core::generator::ContentGenerator;
//! use yester_core::config::GeneratorConfig;
//!
//! # fn main() -> yester_core::Result<()> {
//! let client = GeminiClient::new("my-api-key")?;
//! let generator = ContentGenerator::gemini(client, GeneratorConfig::default());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::generator::{
    ImageBackend, ImageRequest, ImageResponse, Modality, ResponsePart, TextBackend, TextRequest,
};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Client for the public endpoint with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Other("Gemini API key is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the key and endpoint by listing a single model
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/models?pageSize=1", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::api_error(status, resp).await)
        }
    }

    /// `POST models/{model}:generateContent`
    pub async fn generate_content(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        self.post(&url, req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP Helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        debug!("POST {}", url);

        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let data = resp.json().await.map_err(|e| {
                warn!("Failed to parse response: {}", e);
                Error::Other(format!("Failed to parse response: {}", e))
            })?;
            Ok(data)
        } else {
            Err(Self::api_error(status, resp).await)
        }
    }

    async fn api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        Error::api(status.as_u16(), message)
    }
}

#[async_trait]
impl TextBackend for GeminiClient {
    async fn generate_text(&self, request: TextRequest) -> Result<String> {
        let req = GenerateContentRequest::prompt(request.prompt);
        let resp = self.generate_content(&request.model, &req).await?;
        Ok(resp.text())
    }
}

#[async_trait]
impl ImageBackend for GeminiClient {
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse> {
        let req = GenerateContentRequest::prompt(request.prompt).with_generation_config(
            GenerationConfig {
                response_modalities: Some(request.modalities),
                temperature: Some(request.temperature),
            },
        );
        let resp = self.generate_content(&request.model, &req).await?;
        Ok(resp.into_image_response())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single-turn text prompt
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(text.into()),
                    inline_data: None,
                }],
            }],
            generation_config: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<Modality>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .into_iter()
            .flat_map(|candidate| candidate.content.parts.iter())
    }

    /// Concatenated text of the first candidate
    pub fn text(&self) -> String {
        self.parts().filter_map(|part| part.text.as_deref()).collect()
    }

    pub fn into_image_response(self) -> ImageResponse {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(inline), _) => Some(ResponsePart::InlineImage {
                    mime_type: inline.mime_type,
                    data: inline.data,
                }),
                (None, Some(text)) => Some(ResponsePart::Text(text)),
                (None, None) => None,
            })
            .collect();
        ImageResponse { parts }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_empty_key() {
        assert!(GeminiClient::new("  ").is_err());
        let client =
            GeminiClient::with_options("key", "http://localhost:9/v1beta/", DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/v1beta");
    }

    #[test]
    fn test_image_request_wire_format() {
        let config = GenerationConfig {
            response_modalities: Some(vec![Modality::Text, Modality::Image]),
            temperature: Some(0.5),
        };
        let req = GenerateContentRequest::prompt("draw it").with_generation_config(config);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "draw it");
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_none());
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );
        assert_eq!(json["generationConfig"]["temperature"], 0.5);

        let plain = serde_json::to_value(GenerateContentRequest::prompt("hi")).unwrap();
        assert!(plain.get("generationConfig").is_none());
    }

    #[test]
    fn test_parse_text_response() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "EVENT_1:\n" }, { "text": "Title: A" }], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.text(), "EVENT_1:\nTitle: A");

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_parse_image_response() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ] }
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let image = resp.into_image_response();
        assert_eq!(image.parts.len(), 2);
        assert_eq!(image.first_inline_image(), Some(("image/png", "aGVsbG8=")));
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } }"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "API key not valid");
    }
}
