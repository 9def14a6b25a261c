//! AI service integration for text, image, video, and speech generation
//!
//! Each capability is a separate trait so flows can mix providers and tests
//! can swap in the mocks from [`mock`].

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiImageClient, GeminiSpeechClient, GeminiTextClient, GeminiVideoClient};
pub use mock::{MockImageGenerationClient, MockSpeechClient, MockTextClient, MockVideoClient};

use crate::models::MediaRef;
use crate::operation::{GenerationRequest, Operation};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// A single-turn text generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRequest {
    pub system: Option<String>,
    pub prompt: String,
    /// Images attached after the prompt, in order.
    pub media: Vec<MediaRef>,
    /// Ask the model to answer with a JSON document.
    pub json_output: bool,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_media(mut self, media: Vec<MediaRef>) -> Self {
        self.media = media;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Raw image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        mime::DataUri::encode(&self.mime_type, &self.data)
    }
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate_text(&self, request: &TextRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Submit-then-poll video generation.
#[async_trait]
pub trait VideoGenerationService: Send + Sync {
    /// Start a job. `Ok(None)` means the service answered without a handle.
    async fn submit(&self, request: &GenerationRequest) -> Result<Option<Operation>>;

    /// Fetch a fresh snapshot of `operation`.
    async fn check_operation(&self, operation: &Operation) -> Result<Operation>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Returns 16-bit little-endian mono PCM at 24 kHz.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Run `request` in JSON mode and decode the reply into `T`.
pub async fn generate_json<T: DeserializeOwned>(
    service: &dyn TextGenerationService,
    request: TextRequest,
) -> Result<T> {
    let raw = service.generate_text(&request.json()).await?;
    let body = strip_code_fence(&raw);
    serde_json::from_str(body).map_err(|e| {
        tracing::error!("Model returned malformed JSON: {}\nBody: {}", e, raw);
        Error::AiProvider(format!("Failed to parse structured model output: {}", e))
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
