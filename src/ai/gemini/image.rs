use super::client::GeminiHttpClient;
use crate::ai::mime::detect_image_mime;
use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PromptInstance>,
    parameters: ImageParameters,
}

#[derive(Debug, Serialize)]
struct PromptInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

/// Imagen client producing a single square product shot.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = PredictRequest {
            instances: vec![PromptInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        let prediction = response
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.is_some())
            .ok_or_else(|| {
                Error::AiProvider("Image generation failed to return any image data".to_string())
            })?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(prediction.bytes_base64_encoded.unwrap_or_default())
            .map_err(|e| Error::AiProvider(format!("Failed to decode Imagen base64 image: {}", e)))?;

        let mime_type = prediction
            .mime_type
            .unwrap_or_else(|| detect_image_mime(&data).to_string());
        tracing::debug!("Imagen returned {} bytes of {}", data.len(), mime_type);

        Ok(GeneratedImage { data, mime_type })
    }
}
