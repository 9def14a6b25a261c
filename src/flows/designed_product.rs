//! Buyer-designed custom products: an AI product shot plus a predicted price.

use super::{require_non_empty, translate_texts};
use crate::ai::{generate_json, ImageGenerationService, TextGenerationService, TextRequest};
use crate::models::{is_non_english, DesignedProductInput, DesignedProductOutput, MediaRef};
use crate::{prompts, Result};
use rand::Rng;
use serde::Deserialize;
use tracing::{error, info, warn};

/// Price returned when the whole flow fails.
pub const FALLBACK_PRICE: u32 = 150;

#[derive(Debug, Deserialize)]
struct PriceReply {
    price: f64,
}

/// Generate the product image and predict its price.
///
/// An unusable price estimate falls back to a random price in `100..500`;
/// image generation failures are returned as errors.
pub async fn design_product(
    text: &dyn TextGenerationService,
    image: &dyn ImageGenerationService,
    input: &DesignedProductInput,
) -> Result<DesignedProductOutput> {
    require_non_empty("prompt", &input.prompt)?;
    require_non_empty("style", &input.style)?;

    let english_prompt = to_english(text, input).await;

    let image_prompt = prompts::render(
        prompts::PRODUCT_IMAGE,
        &[("prompt", &english_prompt), ("style", &input.style)],
    );
    let generated = image.generate_image(&image_prompt).await?;
    let image_url = generated.to_data_uri();
    info!("Generated product image ({} bytes)", generated.data.len());

    let price_request = TextRequest::new(prompts::render(
        prompts::PRICE_PREDICTION,
        &[("description", &english_prompt)],
    ))
    .with_media(vec![MediaRef::new(image_url.clone(), generated.mime_type)]);

    let predicted_price = match generate_json::<PriceReply>(text, price_request).await {
        Ok(reply) if is_usable_price(reply.price) => reply.price.round() as u32,
        Ok(reply) => {
            warn!("Price prediction returned unusable value {}", reply.price);
            random_fallback_price()
        }
        Err(e) => {
            error!("Price prediction failed, using fallback price: {}", e);
            random_fallback_price()
        }
    };

    Ok(DesignedProductOutput {
        image_url,
        predicted_price,
    })
}

/// Like [`design_product`] but never fails: any error yields
/// `fallback_image_url` and [`FALLBACK_PRICE`].
pub async fn design_product_or_fallback(
    text: &dyn TextGenerationService,
    image: &dyn ImageGenerationService,
    input: &DesignedProductInput,
    fallback_image_url: &str,
) -> DesignedProductOutput {
    match design_product(text, image, input).await {
        Ok(output) => output,
        Err(e) => {
            error!("Error in AI design and price flow, returning fallback: {}", e);
            DesignedProductOutput {
                image_url: fallback_image_url.to_string(),
                predicted_price: FALLBACK_PRICE,
            }
        }
    }
}

async fn to_english(text: &dyn TextGenerationService, input: &DesignedProductInput) -> String {
    let Some(language) = input.language.as_deref().filter(|l| is_non_english(Some(l))) else {
        return input.prompt.clone();
    };

    match translate_texts(text, std::slice::from_ref(&input.prompt), "en").await {
        Ok(translated) => match translated.into_iter().next() {
            Some(english) if !english.trim().is_empty() => english,
            _ => input.prompt.clone(),
        },
        Err(e) => {
            warn!("Could not translate {} prompt, using it as-is: {}", language, e);
            input.prompt.clone()
        }
    }
}

fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0 && price.round() <= f64::from(u32::MAX)
}

fn random_fallback_price() -> u32 {
    rand::thread_rng().gen_range(100..500)
}
