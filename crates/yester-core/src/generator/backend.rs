//! Generative backend seams.
//!
//! The generator only sees these traits; [`crate::client::GeminiClient`]
//! implements both against the Gemini REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Plain text completion request
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
}

/// Output kinds a multimodal request may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

/// Multimodal request expected to return an inline image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub modalities: Vec<Modality>,
    pub temperature: f32,
}

/// One part of a multimodal response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    Text(String),
    InlineImage { mime_type: String, data: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageResponse {
    pub parts: Vec<ResponsePart>,
}

impl ImageResponse {
    /// First inline image payload with non-empty data, as `(mime_type, base64)`.
    pub fn first_inline_image(&self) -> Option<(&str, &str)> {
        self.parts.iter().find_map(|part| match part {
            ResponsePart::InlineImage { mime_type, data } if !data.is_empty() => {
                Some((mime_type.as_str(), data.as_str()))
            }
            _ => None,
        })
    }
}

#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Raw completion text. An empty string is a valid (if useless) answer.
    async fn generate_text(&self, request: TextRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_inline_image_skips_text_and_empty_parts() {
        let response = ImageResponse {
            parts: vec![
                ResponsePart::Text("Here is your image".into()),
                ResponsePart::InlineImage {
                    mime_type: "image/png".into(),
                    data: String::new(),
                },
                ResponsePart::InlineImage {
                    mime_type: "image/jpeg".into(),
                    data: "aGVsbG8=".into(),
                },
            ],
        };
        assert_eq!(response.first_inline_image(), Some(("image/jpeg", "aGVsbG8=")));
        assert_eq!(ImageResponse::default().first_inline_image(), None);
    }

    #[test]
    fn test_modality_wire_names() {
        let json = serde_json::to_string(&[Modality::Text, Modality::Image]).unwrap();
        assert_eq!(json, r#"["TEXT","IMAGE"]"#);
    }
}
