use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::SpeechService;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SpeechRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: SpeechGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

/// Gemini TTS client returning raw PCM.
pub struct GeminiSpeechClient {
    http: GeminiHttpClient,
    voice: String,
}

impl GeminiSpeechClient {
    pub fn new(api_key: String, model: String, voice: String) -> Self {
        Self::new_with_client(api_key, model, voice, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        voice: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(90),
                client,
            ),
            voice,
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiSpeechClient);

#[async_trait]
impl SpeechService for GeminiSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            contents: vec![Content::text(None, text)],
            generation_config: SpeechGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.voice.clone(),
                        },
                    },
                },
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let audio = response
            .first_inline_data()
            .ok_or_else(|| Error::AiProvider("No audio data in Gemini TTS response".to_string()))?;
        tracing::debug!("Gemini returned audio with mime_type: {}", audio.mime_type);

        base64::engine::general_purpose::STANDARD
            .decode(&audio.data)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Gemini audio: {}", e)))
    }
}
