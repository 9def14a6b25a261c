use super::advertisement::MAX_REFERENCE_IMAGES;
use crate::ai::{generate_json, TextGenerationService, TextRequest};
use crate::models::{AdvertisementDescriptionInput, AdvertisementDescriptionOutput};
use crate::{prompts, Error, Result};

/// Ask the text model to write a video prompt for the artisan's products.
pub async fn generate_advertisement_description(
    text: &dyn TextGenerationService,
    input: &AdvertisementDescriptionInput,
) -> Result<AdvertisementDescriptionOutput> {
    if input.images.len() > MAX_REFERENCE_IMAGES {
        return Err(Error::InvalidInput(format!(
            "At most {} reference photos are supported",
            MAX_REFERENCE_IMAGES
        )));
    }

    let artisan = match input.artisan_name.trim() {
        "" => "an artisan",
        name => name,
    };
    let categories = if input.product_categories.is_empty() {
        "handmade crafts".to_string()
    } else {
        input.product_categories.join(", ")
    };

    let prompt = prompts::render(
        prompts::ADVERTISEMENT_DESCRIPTION,
        &[("artisan", artisan), ("categories", &categories)],
    );
    let request = TextRequest::new(prompt).with_media(input.images.clone());

    let output: AdvertisementDescriptionOutput = generate_json(text, request).await?;
    if output.description.trim().is_empty() {
        return Err(Error::AiProvider(
            "Failed to generate advertisement description.".to_string(),
        ));
    }

    tracing::info!(
        "Generated advertisement description ({} chars)",
        output.description.len()
    );
    Ok(AdvertisementDescriptionOutput {
        description: output.description.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockTextClient;
    use crate::models::MediaRef;

    fn input() -> AdvertisementDescriptionInput {
        AdvertisementDescriptionInput {
            artisan_name: "Meera".to_string(),
            product_categories: vec!["Pottery".to_string(), "Textiles".to_string()],
            images: vec![MediaRef::new("data:image/png;base64,iVBORw==", "image/png")],
        }
    }

    #[tokio::test]
    async fn test_description_uses_artisan_and_images() {
        let client = MockTextClient::new().with_response(
            r#"{"description": " A cinematic shot of terracotta pots. "}"#.to_string(),
        );

        let output = generate_advertisement_description(&client, &input())
            .await
            .unwrap();
        assert_eq!(output.description, "A cinematic shot of terracotta pots.");

        let request = &client.get_requests()[0];
        assert!(request.json_output);
        assert!(request.prompt.contains("Meera"));
        assert!(request.prompt.contains("Pottery, Textiles"));
        assert_eq!(request.media.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_description_is_an_error() {
        let client = MockTextClient::new().with_response(r#"{"description": "  "}"#.to_string());

        let err = generate_advertisement_description(&client, &input())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_defaults_for_missing_details() {
        let client = MockTextClient::new().with_response(r#"{"description": "ok"}"#.to_string());
        let input = AdvertisementDescriptionInput {
            artisan_name: String::new(),
            product_categories: Vec::new(),
            images: Vec::new(),
        };

        generate_advertisement_description(&client, &input)
            .await
            .unwrap();

        let prompt = &client.get_requests()[0].prompt;
        assert!(prompt.contains("an artisan"));
        assert!(prompt.contains("handmade crafts"));
    }
}
