//! Application wiring: the Gemini-backed services plus the settings each flow needs.

use crate::ai::{
    GeminiImageClient, GeminiSpeechClient, GeminiTextClient, GeminiVideoClient,
    ImageGenerationService, SpeechService, TextGenerationService, VideoGenerationService,
};
use crate::flows;
use crate::history::{AdvertisementHistory, SavedAdvertisement};
use crate::models::{
    AdvertisementDescriptionInput, AdvertisementDescriptionOutput, AdvertisementInput,
    AdvertisementOutput, Config, DesignedProductInput, DesignedProductOutput, SalesPotentialInput,
    SalesPotentialOutput,
};
use crate::poller::PollConfig;
use crate::{Error, Result};
use std::path::PathBuf;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const DESCRIPTION_ATTEMPTS: usize = 3;
const DESCRIPTION_RETRY_DELAY_MS: u64 = 2000;

/// Runs the artisan flows against one set of AI services.
pub struct App {
    text: Box<dyn TextGenerationService>,
    image: Box<dyn ImageGenerationService>,
    video: Box<dyn VideoGenerationService>,
    speech: Box<dyn SpeechService>,
    video_poll: PollConfig,
    fallback_image_url: String,
    history: AdvertisementHistory,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub text: Box<dyn TextGenerationService>,
    pub image: Box<dyn ImageGenerationService>,
    pub video: Box<dyn VideoGenerationService>,
    pub speech: Box<dyn SpeechService>,
}

/// Non-service settings, normally taken from [`Config`].
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub video_poll: PollConfig,
    pub fallback_image_url: String,
    pub history_path: PathBuf,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            video_poll: config.video_poll,
            fallback_image_url: config.fallback_image_url.clone(),
            history_path: config.history_path.clone(),
        }
    }
}

impl App {
    pub fn with_services(services: AppServices, settings: AppSettings) -> Self {
        Self {
            text: services.text,
            image: services.image,
            video: services.video,
            speech: services.speech,
            video_poll: settings.video_poll,
            fallback_image_url: settings.fallback_image_url,
            history: AdvertisementHistory::new(settings.history_path),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();
        let key = || config.gemini_api_key.clone();

        info!(
            "Models: text={} image={} video={} speech={} (voice {})",
            config.text_model,
            config.image_model,
            config.video_model,
            config.speech_model,
            config.speech_voice
        );

        Self::with_services(
            AppServices {
                text: Box::new(GeminiTextClient::new_with_client(
                    key(),
                    config.text_model.clone(),
                    http_client.clone(),
                )),
                image: Box::new(GeminiImageClient::new_with_client(
                    key(),
                    config.image_model.clone(),
                    http_client.clone(),
                )),
                video: Box::new(GeminiVideoClient::new_with_client(
                    key(),
                    config.video_model.clone(),
                    http_client.clone(),
                )),
                speech: Box::new(GeminiSpeechClient::new_with_client(
                    key(),
                    config.speech_model.clone(),
                    config.speech_voice.clone(),
                    http_client,
                )),
            },
            AppSettings::from(config),
        )
    }

    pub fn history(&self) -> &AdvertisementHistory {
        &self.history
    }

    /// Generate a video advertisement, waiting for the long-running job.
    pub async fn advertise(
        &self,
        input: &AdvertisementInput,
        cancel: &CancellationToken,
    ) -> Result<AdvertisementOutput> {
        flows::generate_advertisement(self.video.as_ref(), self.video_poll, input, cancel)
            .await
            .map_err(|e| {
                error!("Advertisement generation failed: {}", e);
                e
            })
    }

    /// Generate an advertisement and record it in the history file.
    pub async fn advertise_and_save(
        &self,
        input: &AdvertisementInput,
        cancel: &CancellationToken,
    ) -> Result<(AdvertisementOutput, SavedAdvertisement)> {
        let output = self.advertise(input, cancel).await?;
        let saved = self
            .history
            .save(&output.video_url, &output.description)
            .await?;
        Ok((output, saved))
    }

    /// Write an advertisement prompt, retrying when the model returns nothing usable.
    pub async fn describe_advertisement(
        &self,
        input: &AdvertisementDescriptionInput,
    ) -> Result<AdvertisementDescriptionOutput> {
        let retry_strategy =
            FixedInterval::from_millis(DESCRIPTION_RETRY_DELAY_MS).take(DESCRIPTION_ATTEMPTS - 1);

        RetryIf::spawn(
            retry_strategy,
            || async move {
                flows::generate_advertisement_description(self.text.as_ref(), input)
                    .await
                    .map_err(|e| {
                        warn!("Description attempt failed: {}. Will retry...", e);
                        e
                    })
            },
            |e: &Error| matches!(e, Error::AiProvider(_)),
        )
        .await
        .map_err(|e| {
            error!("Failed to generate advertisement description: {}", e);
            e
        })
    }

    /// Design a product; never fails, see [`flows::design_product_or_fallback`].
    pub async fn design_product(&self, input: &DesignedProductInput) -> DesignedProductOutput {
        flows::design_product_or_fallback(
            self.text.as_ref(),
            self.image.as_ref(),
            input,
            &self.fallback_image_url,
        )
        .await
    }

    pub async fn analyze_sales(&self, input: &SalesPotentialInput) -> Result<SalesPotentialOutput> {
        flows::analyze_sales_potential(self.text.as_ref(), self.speech.as_ref(), input).await
    }
}
