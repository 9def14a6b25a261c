use super::client::GeminiHttpClient;
use crate::ai::mime::{is_data_uri, DataUri};
use crate::ai::VideoGenerationService;
use crate::operation::{GenerationRequest, Operation, ResultPart};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct VideoRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageInput {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
}

/// Google long-running operation resource.
#[derive(Debug, Deserialize)]
struct OperationResource {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoFile {
    uri: Option<String>,
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

impl OperationResource {
    fn into_operation(self, fallback_name: &str) -> Operation {
        let name = self.name.unwrap_or_else(|| fallback_name.to_string());

        if !self.done {
            return Operation::pending(name);
        }
        if let Some(status) = self.error {
            return Operation::failed(name, status.code, status.message);
        }

        let response = self
            .response
            .and_then(|r| r.generate_video_response)
            .unwrap_or_default();

        let mut parts: Vec<ResultPart> = response
            .generated_samples
            .into_iter()
            .filter_map(|sample| sample.video)
            .filter_map(|video| {
                let content_type = video
                    .mime_type
                    .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());
                let url = match (video.uri, video.bytes_base64_encoded) {
                    (Some(uri), _) => uri,
                    (None, Some(b64)) => format!("data:{};base64,{}", content_type, b64),
                    (None, None) => return None,
                };
                Some(ResultPart::Media { content_type, url })
            })
            .collect();

        parts.extend(
            response
                .rai_media_filtered_reasons
                .into_iter()
                .map(|text| ResultPart::Text { text }),
        );

        Operation::succeeded(name, parts)
    }
}

/// Veo client speaking the `predictLongRunning` + operations protocol.
pub struct GeminiVideoClient {
    http: GeminiHttpClient,
}

impl GeminiVideoClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(60),
                client,
            ),
        }
    }

    /// Fetch the bytes behind a generated video URI.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        if is_data_uri(url) {
            return Ok(DataUri::parse(url)?.data);
        }
        self.http.download(url).await
    }

    fn build_request(request: &GenerationRequest) -> Result<VideoRequest> {
        // Veo takes at most one starting frame; remote URLs are not accepted here.
        let image = request
            .reference_media
            .iter()
            .find(|media| is_data_uri(&media.url))
            .map(|media| DataUri::parse(&media.url))
            .transpose()?
            .map(|decoded| ImageInput {
                bytes_base64_encoded: decoded.base64_payload(),
                mime_type: decoded.mime_type,
            });

        Ok(VideoRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image,
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9".to_string(),
            },
        })
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiVideoClient);

#[async_trait]
impl VideoGenerationService for GeminiVideoClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<Option<Operation>> {
        let body = Self::build_request(request)?;
        tracing::info!("Submitting video generation to {}", self.http.model());

        let resource: OperationResource = self.http.predict_long_running(&body).await?;
        let Some(name) = resource.name.clone() else {
            tracing::warn!("Veo accepted the request but returned no operation name");
            return Ok(None);
        };

        Ok(Some(resource.into_operation(&name)))
    }

    async fn check_operation(&self, operation: &Operation) -> Result<Operation> {
        let resource: OperationResource = self.http.get_operation(&operation.name).await?;
        Ok(resource.into_operation(&operation.name))
    }
}
