//! Image-generation providers.
//!
//! `ImageProvider::generate` is BLOCKING: it is always run through
//! `tokio::task::spawn_blocking` by the illustrator, never on the async executor.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The image model used for all illustrations.
pub const IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No image data in response")]
    NoImage,

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode/encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A blocking text-to-image backend returning encoded image bytes.
pub trait ImageProvider: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: Option<String>,
    pub data: String,
}

impl GenerateContentResponse {
    /// Decodes the first inline image of the first candidate.
    pub fn image_bytes(&self) -> Result<Vec<u8>, ImageError> {
        let parts = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default();

        let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) else {
            if let Some(text) = parts.iter().find_map(|p| p.text.as_deref()) {
                debug!("Image model answered with text only: {text}");
            }
            return Err(ImageError::NoImage);
        };

        debug!(
            "Inline image payload: mime_type={:?}, {} base64 chars",
            inline.mime_type,
            inline.data.len()
        );
        Ok(STANDARD.decode(inline.data.trim())?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiImageProvider
// ────────────────────────────────────────────────────────────────────────────

/// Gemini `generateContent` image provider.
pub struct GeminiImageProvider {
    api_key: String,
    endpoint: String,
}

impl GeminiImageProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: format!("{GEMINI_API_BASE}/{IMAGE_MODEL}:generateContent"),
        }
    }
}

impl ImageProvider for GeminiImageProvider {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        };

        // A blocking client must be created and dropped off the async executor.
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        info!(
            "Requesting image from {IMAGE_MODEL}: {}...",
            prompt.chars().take(100).collect::<String>()
        );

        let response = client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(ImageError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        parsed.image_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tiny_png;

    #[test]
    fn test_image_bytes_decodes_first_inline_part() {
        let png = tiny_png();
        let json = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your illustration."},
                        {"inlineData": {"mimeType": "image/png", "data": STANDARD.encode(&png)}}
                    ]
                }
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.image_bytes().unwrap(), png);
    }

    #[test]
    fn test_text_only_response_has_no_image() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.image_bytes(), Err(ImageError::NoImage)));
    }

    #[test]
    fn test_empty_candidates_has_no_image() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.image_bytes(), Err(ImageError::NoImage)));
    }

    #[test]
    fn test_corrupt_base64_is_reported() {
        let json = r#"{"candidates": [{"content": {"parts": [{"inlineData": {"data": "!!not base64!!"}}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.image_bytes(), Err(ImageError::Base64(_))));
    }

    #[test]
    fn test_request_body_asks_for_image_modality() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "a kite" }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "a kite");
        assert_eq!(
            value["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );
    }

    #[test]
    fn test_endpoint_targets_image_model() {
        let provider = GeminiImageProvider::new("key".to_string());
        assert!(provider
            .endpoint
            .ends_with("gemini-2.0-flash-preview-image-generation:generateContent"));
    }
}
