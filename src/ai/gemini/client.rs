use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client used by the text/image/video/speech modules.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    model: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `veo-3.0-generate-preview`),
    /// not a `models/...`-prefixed path segment.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn is_own_url(&self, url: &str) -> bool {
        url.strip_prefix(self.base_url.trim_end_matches('/'))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
    }

    async fn send<Resp: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Resp> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    async fn post_model_method<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:{}",
            self.base_url, self.model, method
        );
        self.send(
            self.client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(request),
        )
        .await
    }

    /// Calls Gemini's `generateContent` endpoint for text and speech requests.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        self.post_model_method("generateContent", request).await
    }

    /// Calls the Imagen `predict` endpoint.
    pub async fn predict<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        self.post_model_method("predict", request).await
    }

    /// Starts a Veo job via `predictLongRunning`.
    pub async fn predict_long_running<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        self.post_model_method("predictLongRunning", request).await
    }

    /// Fetches an operation by its fully qualified name
    /// (`models/<model>/operations/<id>`).
    pub async fn get_operation<Resp: DeserializeOwned>(&self, name: &str) -> Result<Resp> {
        let url = format!("{}/v1beta/{}", self.base_url, name.trim_start_matches('/'));
        self.send(self.client.get(&url)).await
    }

    /// Downloads a generated file. The API key is only sent to the Gemini host.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let request = self.client.get(url);
        let request = if self.is_own_url(url) {
            self.authorized(request)
        } else {
            tracing::debug!("Downloading {} without credentials", url);
            request.timeout(self.timeout)
        };
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Gemini file download failed (status {}): {}", status, url);
            return Err(Error::AiProvider(format!(
                "Gemini file download failed (status {})",
                status
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
