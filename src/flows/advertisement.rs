//! Video advertisement generation.
//!
//! The reference photos are validated but not forwarded to the video model;
//! they inform the written prompt (see
//! [`advertisement_description`](super::advertisement_description)) and would
//! otherwise compete with it.

use super::require_non_empty;
use crate::ai::VideoGenerationService;
use crate::models::{AdvertisementInput, AdvertisementOutput};
use crate::operation::GenerationRequest;
use crate::poller::{OperationPoller, PollConfig};
use crate::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const VIDEO_MEDIA_PREFIX: &str = "video/";
pub const MAX_REFERENCE_IMAGES: usize = 3;
pub const VIDEO_DESCRIPTION: &str =
    "A promotional video generated based on the provided images and prompt.";

pub fn validate(input: &AdvertisementInput) -> Result<()> {
    require_non_empty("prompt", &input.prompt)?;

    if input.images.is_empty() || input.images.len() > MAX_REFERENCE_IMAGES {
        return Err(Error::InvalidInput(format!(
            "Wrong number of photos uploaded ({}). Please select between 1 and {} photos.",
            input.images.len(),
            MAX_REFERENCE_IMAGES
        )));
    }
    if let Some(bad) = input
        .images
        .iter()
        .find(|image| !image.content_type.starts_with("image/"))
    {
        return Err(Error::InvalidInput(format!(
            "Reference media must be an image, got {}",
            bad.content_type
        )));
    }
    Ok(())
}

pub async fn generate_advertisement(
    video: &dyn VideoGenerationService,
    poll: PollConfig,
    input: &AdvertisementInput,
    cancel: &CancellationToken,
) -> Result<AdvertisementOutput> {
    validate(input)?;
    info!(
        "Generating video advertisement ({} reference photo(s))",
        input.images.len()
    );

    let request = GenerationRequest::new(input.prompt.trim());
    let media = OperationPoller::new(video, poll)
        .generate_media(&request, VIDEO_MEDIA_PREFIX, VIDEO_DESCRIPTION, cancel)
        .await?;

    info!("Video advertisement ready ({})", media.content_type);
    Ok(AdvertisementOutput {
        video_url: media.url,
        description: media.description,
    })
}
