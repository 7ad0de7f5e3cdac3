//! Hugging Face Inference API text-to-image client.

use crate::credential::Credential;
use crate::error::{Result, Text2ImageError};
use crate::image::provider::{Handle, HandleFactory, TextToImageClient};
use crate::image::types::{GenerationMetadata, GenerationRequest, GenerationResult, ImageFormat};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Default serverless inference endpoint; the model id is appended.
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Environment variable overriding the inference endpoint.
pub const ENDPOINT_ENV_VAR: &str = "HF_INFERENCE_ENDPOINT";

/// Builder for [`HuggingFaceFactory`].
#[derive(Debug, Clone, Default)]
pub struct HuggingFaceFactoryBuilder {
    endpoint: Option<String>,
    client: Option<reqwest::Client>,
}

impl HuggingFaceFactoryBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint base URL. Falls back to `HF_INFERENCE_ENDPOINT`,
    /// then the public serverless API.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Shares an existing HTTP client between handles.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the factory.
    pub fn build(self) -> HuggingFaceFactory {
        let endpoint = self
            .endpoint
            .or_else(|| std::env::var(ENDPOINT_ENV_VAR).ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        HuggingFaceFactory {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            // No timeout: the transport default applies.
            client: self.client.unwrap_or_default(),
        }
    }
}

/// Creates [`HuggingFaceClient`] handles.
#[derive(Debug, Clone)]
pub struct HuggingFaceFactory {
    endpoint: String,
    client: reqwest::Client,
}

impl HuggingFaceFactory {
    /// Creates a new `HuggingFaceFactoryBuilder`.
    pub fn builder() -> HuggingFaceFactoryBuilder {
        HuggingFaceFactoryBuilder::new()
    }

    /// Returns the endpoint base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HuggingFaceFactory {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HandleFactory for HuggingFaceFactory {
    fn create(&self, model: &str, credential: &Credential) -> Result<Handle> {
        tracing::debug!(model, endpoint = %self.endpoint, "creating inference client");
        Ok(Arc::new(HuggingFaceClient {
            client: self.client.clone(),
            url: format!("{}/{}", self.endpoint, model),
            model: model.to_string(),
            credential: credential.clone(),
        }))
    }
}

/// Inference client bound to one model.
pub struct HuggingFaceClient {
    client: reqwest::Client,
    url: String,
    model: String,
    credential: Credential,
}

impl std::fmt::Debug for HuggingFaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl HuggingFaceClient {
    /// Extracts the provider message from an error response body.
    fn error_message(status: u16, text: &str) -> String {
        if let Ok(body) = serde_json::from_str::<HfErrorResponse>(text) {
            if let Some(message) = body.error.into_message() {
                return message;
            }
        }
        let text = text.trim();
        if text.is_empty() {
            format!("HTTP {status}")
        } else {
            text.to_string()
        }
    }
}

#[async_trait]
impl TextToImageClient for HuggingFaceClient {
    async fn text_to_image(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let start = Instant::now();
        let body = HfTextToImageRequest::from_generation_request(request);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(Text2ImageError::remote)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = Self::error_message(status.as_u16(), &text);
            tracing::warn!(model = %self.model, status = status.as_u16(), "inference call failed");
            return Err(Text2ImageError::RemoteCall(message));
        }

        let data = response.bytes().await.map_err(Text2ImageError::remote)?;
        let source_format = ImageFormat::from_magic_bytes(&data);
        let image = match source_format {
            Some(format) => ::image::load_from_memory_with_format(&data, format.to_codec()),
            None => ::image::load_from_memory(&data),
        }
        .map_err(|e| Text2ImageError::RemoteCall(format!("undecodable image: {e}")))?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            model = %self.model,
            duration_ms,
            bytes = data.len(),
            "inference call complete"
        );

        Ok(GenerationResult::new(
            image,
            request.width(),
            request.height(),
            GenerationMetadata {
                model: Some(self.model.clone()),
                duration_ms: Some(duration_ms),
                source_format,
            },
        ))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct HfTextToImageRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
}

impl HfTextToImageRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            inputs: req.prompt.clone(),
            parameters: HfParameters {
                negative_prompt: req.negative_prompt.clone(),
                width: req.width(),
                height: req.height(),
                num_inference_steps: req.steps,
                guidance_scale: req.guidance_scale,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct HfErrorResponse {
    error: HfErrorField,
}

/// The API reports either a single message or a list of messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HfErrorField {
    Message(String),
    Messages(Vec<String>),
}

impl HfErrorField {
    fn into_message(self) -> Option<String> {
        match self {
            Self::Message(m) if !m.trim().is_empty() => Some(m),
            Self::Messages(ms) if !ms.is_empty() => Some(ms.join("; ")),
            _ => None,
        }
    }
}
