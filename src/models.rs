//! Data models and structures
//!
//! Defines the inputs and outputs of each AI flow, the media references
//! passed between them, and the environment-driven configuration.

use crate::poller::PollConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A piece of media identified by a locator and its MIME type.
///
/// `url` is either a `data:` URI or a remote URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub url: String,
    pub content_type: String,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementInput {
    pub prompt: String,
    pub images: Vec<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementOutput {
    pub video_url: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementDescriptionInput {
    pub artisan_name: String,
    pub product_categories: Vec<String>,
    #[serde(default)]
    pub images: Vec<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementDescriptionOutput {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignedProductInput {
    pub prompt: String,
    pub style: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignedProductOutput {
    pub image_url: String,
    pub predicted_price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPotentialInput {
    pub product_name: String,
    pub product_description: String,
    pub product_category: String,
    /// Price in INR.
    pub product_price: f64,
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictedPerformance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPotentialOutput {
    pub analysis: String,
    pub suggestions: String,
    pub predicted_performance: PredictedPerformance,
    /// `data:audio/wav;base64,...` rendering of the analysis and suggestions.
    pub analysis_audio: String,
}

/// Returns true when `language` names something other than English.
pub fn is_non_english(language: Option<&str>) -> bool {
    matches!(language, Some(lang) if !lang.trim().is_empty() && lang != "en")
}

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-fast-generate-001";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.0-generate-preview";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_SPEECH_VOICE: &str = "Algenib";
pub const DEFAULT_FALLBACK_IMAGE_URL: &str = "https://picsum.photos/seed/fallback/512/512";
pub const DEFAULT_HISTORY_PATH: &str = "output/saved_advertisements.json";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub speech_model: String,
    pub speech_voice: String,
    pub video_poll: PollConfig,
    pub fallback_image_url: String,
    pub history_path: PathBuf,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        load_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let gemini_api_key = var("GEMINI_API_KEY")
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let interval_secs = parse_u64(var("VIDEO_POLL_INTERVAL_SECS"), "VIDEO_POLL_INTERVAL_SECS")?
            .unwrap_or(5);
        if interval_secs == 0 {
            return Err(Error::Config(
                "VIDEO_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        // 0 disables the deadline entirely
        let deadline = match parse_u64(var("VIDEO_POLL_TIMEOUT_SECS"), "VIDEO_POLL_TIMEOUT_SECS")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => PollConfig::default().deadline,
        };
        let max_polls = match parse_u64(var("VIDEO_MAX_POLLS"), "VIDEO_MAX_POLLS")? {
            Some(0) => {
                return Err(Error::Config(
                    "VIDEO_MAX_POLLS must be greater than zero (leave unset for no cap)"
                        .to_string(),
                ))
            }
            polls => polls.map(|n| n as usize),
        };

        Ok(Self {
            gemini_api_key,
            text_model: or_default("TEXT_MODEL", DEFAULT_TEXT_MODEL),
            image_model: or_default("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            video_model: or_default("VIDEO_MODEL", DEFAULT_VIDEO_MODEL),
            speech_model: or_default("SPEECH_MODEL", DEFAULT_SPEECH_MODEL),
            speech_voice: or_default("SPEECH_VOICE", DEFAULT_SPEECH_VOICE),
            video_poll: PollConfig {
                interval: Duration::from_secs(interval_secs),
                deadline,
                max_polls,
            },
            fallback_image_url: or_default("FALLBACK_IMAGE_URL", DEFAULT_FALLBACK_IMAGE_URL),
            history_path: PathBuf::from(or_default("AD_HISTORY_PATH", DEFAULT_HISTORY_PATH)),
        })
    }
}

/// A missing `.env` is fine; a malformed one is an error.
fn load_dotenv<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_u64(value: Option<String>, key: &str) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got '{}'", key, v)))
        })
        .transpose()
}
