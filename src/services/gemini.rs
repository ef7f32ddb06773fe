// src/services/gemini.rs
//
// Client for the remote generation capability. Three call shapes: image edit
// (transform/upscale), image generation from scratch, and text generation
// (describe/translate). Failures stay raw here; classification happens at the
// orchestrator boundary.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use log::debug;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::AspectRatio;

const EDIT_MODEL: &str = "gemini-2.5-flash-image";
const GENERATE_MODEL: &str = "imagen-4.0-generate-001";
const TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Raw failure from the remote capability, before classification.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The call never produced a parseable response (network, timeout, bad JSON).
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-success status; the body text is kept
    /// verbatim for the classifier's substring matching.
    #[error("{0}")]
    Provider(String),
}

/// What an image call may hand back: the model can return image bytes, text
/// commentary, or both.
#[derive(Debug, Default)]
pub struct BackendReply {
    pub image: Option<Vec<u8>>,
    pub text: Option<String>,
}

/// The remote generation capability, behind a trait so the orchestrator can
/// be exercised against a mock.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Edit an existing image per the prompt. Used for transform and upscale.
    async fn edit_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<BackendReply, BackendError>;

    /// Synthesize an image with no input image. The aspect ratio is passed as
    /// a native parameter, separate from the prompt text.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<BackendReply, BackendError>;

    /// Produce text, optionally conditioned on an image. Used for describe
    /// and translate.
    async fn generate_text(
        &self,
        prompt: &str,
        image: Option<(&[u8], &str)>,
    ) -> Result<String, BackendError>;
}

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::Provider(format!("{status}: {error_text}")));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Transport(format!("failed to parse response: {e}")))
    }

    /// Pull image bytes and/or text out of a generateContent response. The
    /// parts array may interleave commentary with inline image data.
    fn extract_parts(result: &serde_json::Value) -> Result<BackendReply, BackendError> {
        let parts = result["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                BackendError::Transport("no content parts in response".to_string())
            })?;

        let mut reply = BackendReply::default();
        for part in parts {
            if let Some(data) = part["inlineData"]["data"].as_str() {
                let bytes = general_purpose::STANDARD
                    .decode(data)
                    .map_err(|e| BackendError::Transport(format!("failed to decode image: {e}")))?;
                reply.image = Some(bytes);
            } else if let Some(text) = part["text"].as_str() {
                reply.text = Some(text.to_string());
            }
        }
        Ok(reply)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn edit_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<BackendReply, BackendError> {
        debug!("dispatching image edit, {} input bytes", image.len());
        let base64_image = general_purpose::STANDARD.encode(image);
        let url = format!("{}/models/{}:generateContent", self.base_url, EDIT_MODEL);

        let result = self
            .post_json(
                &url,
                json!({
                    "contents": [{
                        "parts": [
                            { "inlineData": { "mimeType": mime, "data": base64_image } },
                            { "text": prompt }
                        ]
                    }],
                    "generationConfig": {
                        "responseModalities": ["IMAGE", "TEXT"]
                    }
                }),
            )
            .await?;

        Self::extract_parts(&result)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<BackendReply, BackendError> {
        debug!("dispatching image generation, aspect ratio {aspect_ratio}");
        let url = format!("{}/models/{}:predict", self.base_url, GENERATE_MODEL);

        let result = self
            .post_json(
                &url,
                json!({
                    "instances": [{ "prompt": prompt }],
                    "parameters": {
                        "sampleCount": 1,
                        "outputMimeType": "image/png",
                        "aspectRatio": aspect_ratio.as_ratio()
                    }
                }),
            )
            .await?;

        let mut reply = BackendReply::default();
        if let Some(b64) = result["predictions"][0]["bytesBase64Encoded"].as_str() {
            let bytes = general_purpose::STANDARD
                .decode(b64)
                .map_err(|e| BackendError::Transport(format!("failed to decode image: {e}")))?;
            reply.image = Some(bytes);
        }
        Ok(reply)
    }

    async fn generate_text(
        &self,
        prompt: &str,
        image: Option<(&[u8], &str)>,
    ) -> Result<String, BackendError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, TEXT_MODEL);

        let mut parts = Vec::new();
        if let Some((bytes, mime)) = image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": mime,
                    "data": general_purpose::STANDARD.encode(bytes)
                }
            }));
        }
        parts.push(json!({ "text": prompt }));

        let result = self
            .post_json(&url, json!({ "contents": [{ "parts": parts }] }))
            .await?;

        let text = result["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| BackendError::Transport("no text in response".to_string()))?;
        Ok(text.trim().to_string())
    }
}
