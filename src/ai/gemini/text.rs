use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::{TextGenerationService, TextRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TextGenerationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
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

    fn build_request(request: &TextRequest) -> Result<TextGenerationRequest> {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];
        for media in &request.media {
            parts.push(Part::from_media(media)?);
        }

        Ok(TextGenerationRequest {
            system_instruction: request
                .system
                .as_ref()
                .map(|system| Content::text(None, system.clone())),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: TextGenerationConfig {
                max_output_tokens: Some(4096),
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
            },
        })
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiTextClient);

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let body = Self::build_request(request)?;
        tracing::debug!(
            "Sending text request to {} with {} media part(s)",
            self.http.model(),
            request.media.len()
        );

        let response: GenerateContentResponse = self.http.generate_content(&body).await?;

        response
            .first_text()
            .ok_or_else(|| Error::AiProvider("No text in Gemini response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::models::MediaRef;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    fn make_client(server: &MockServer, model: &str) -> GeminiTextClient {
        GeminiTextClient::new("test-key".to_string(), model.to_string())
            .with_base_url(server.uri())
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn test_generate_text_parses_response() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(text_response("A slow pan across hand-thrown vases"))
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let text = client
            .generate_text(&TextRequest::new("write an ad"))
            .await
            .unwrap();

        assert_eq!(text, "A slow pan across hand-thrown vases");
    }

    #[tokio::test]
    async fn test_json_mode_sets_response_mime_type() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains(
                "\"responseMimeType\":\"application/json\"",
            ))
            .respond_with(text_response("{\"price\": 300}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        client
            .generate_text(&TextRequest::new("appraise").json())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_media_is_sent_as_inline_data() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"data\":\"/9j/\""))
            .respond_with(text_response("a blue vase"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let request = TextRequest::new("describe")
            .with_media(vec![MediaRef::new("data:image/jpeg;base64,/9j/", "image/jpeg")]);

        client.generate_text(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_media_fails_before_request() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(text_response("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let request = TextRequest::new("describe")
            .with_media(vec![MediaRef::new("data:image/jpeg,raw", "image/jpeg")]);

        let err = client.generate_text(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let err = client
            .generate_text(&TextRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let err = client
            .generate_text(&TextRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(text_response("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "models/gemini-2.5-flash");
        client.generate_text(&TextRequest::new("hi")).await.unwrap();
    }
}
