use super::{require_non_empty, translate_texts};
use crate::ai::{generate_json, SpeechService, TextGenerationService, TextRequest};
use crate::audio::wav_data_uri;
use crate::models::{is_non_english, PredictedPerformance, SalesPotentialInput, SalesPotentialOutput};
use crate::{prompts, Error, Result};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    analysis: String,
    suggestions: String,
    predicted_performance: PredictedPerformance,
}

fn validate(input: &SalesPotentialInput) -> Result<()> {
    require_non_empty("productName", &input.product_name)?;
    require_non_empty("productDescription", &input.product_description)?;
    require_non_empty("productCategory", &input.product_category)?;
    if !input.product_price.is_finite() || input.product_price < 0.0 {
        return Err(Error::InvalidInput(format!(
            "productPrice must be a non-negative number, got {}",
            input.product_price
        )));
    }
    Ok(())
}

/// Analyse a product against the market context and narrate the result.
pub async fn analyze_sales_potential(
    text: &dyn TextGenerationService,
    speech: &dyn SpeechService,
    input: &SalesPotentialInput,
) -> Result<SalesPotentialOutput> {
    validate(input)?;

    let price = input.product_price.to_string();
    let prompt = prompts::render(
        prompts::SALES_POTENTIAL,
        &[
            ("history", prompts::SALES_HISTORY.trim()),
            ("name", &input.product_name),
            ("category", &input.product_category),
            ("price", &price),
            ("description", &input.product_description),
        ],
    );

    let reply: AnalysisReply = generate_json(text, TextRequest::new(prompt)).await?;
    info!(
        "Sales analysis for '{}': {:?}",
        input.product_name, reply.predicted_performance
    );

    let (analysis, suggestions) = match input.target_language.as_deref() {
        Some(language) if is_non_english(Some(language)) => {
            let texts = [reply.analysis, reply.suggestions];
            let translated = translate_texts(text, &texts, language).await?;
            match <[String; 2]>::try_from(translated) {
                Ok([analysis, suggestions]) => (analysis, suggestions),
                Err(other) => {
                    warn!(
                        "Expected 2 translations into {}, got {}; keeping English",
                        language,
                        other.len()
                    );
                    let [analysis, suggestions] = texts;
                    (analysis, suggestions)
                }
            }
        }
        _ => (reply.analysis, reply.suggestions),
    };

    let pcm = speech
        .synthesize(&format!("{}\n\n{}", analysis, suggestions))
        .await?;
    let analysis_audio = wav_data_uri(&pcm)?;

    Ok(SalesPotentialOutput {
        analysis,
        suggestions,
        predicted_performance: reply.predicted_performance,
        analysis_audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockSpeechClient, MockTextClient};

    const REPLY: &str = r#"```json
{"analysis": "Strong category.", "suggestions": "Mention the kiln.", "predictedPerformance": "High"}
```"#;

    fn input(language: Option<&str>) -> SalesPotentialInput {
        SalesPotentialInput {
            product_name: "Terracotta planter".to_string(),
            product_description: "Hand-thrown and sun dried".to_string(),
            product_category: "Pottery".to_string(),
            product_price: 120.0,
            target_language: language.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_analysis_is_narrated() {
        let text = MockTextClient::new().with_response(REPLY.to_string());
        let speech = MockSpeechClient::new();

        let output = analyze_sales_potential(&text, &speech, &input(None))
            .await
            .unwrap();

        assert_eq!(output.analysis, "Strong category.");
        assert_eq!(output.suggestions, "Mention the kiln.");
        assert_eq!(output.predicted_performance, PredictedPerformance::High);
        assert!(output.analysis_audio.starts_with("data:audio/wav;base64,"));
        assert_eq!(
            speech.get_texts(),
            vec!["Strong category.\n\nMention the kiln.".to_string()]
        );

        let prompt = &text.get_requests()[0].prompt;
        assert!(prompt.contains("₹120"));
        assert!(prompt.contains("Pottery"));
        assert!(prompt.contains("highest-selling categories"));
    }

    #[tokio::test]
    async fn test_translates_for_non_english_target() {
        let text = MockTextClient::new()
            .with_response(REPLY.to_string())
            .with_response(r#"{"translations": ["मजबूत श्रेणी।", "भट्ठी का उल्लेख करें।"]}"#.to_string());
        let speech = MockSpeechClient::new();

        let output = analyze_sales_potential(&text, &speech, &input(Some("hi")))
            .await
            .unwrap();

        assert_eq!(output.analysis, "मजबूत श्रेणी।");
        assert_eq!(output.suggestions, "भट्ठी का उल्लेख करें।");
        assert!(speech.get_texts()[0].starts_with("मजबूत"));
    }

    #[tokio::test]
    async fn test_translation_count_mismatch_keeps_english() {
        let text = MockTextClient::new()
            .with_response(REPLY.to_string())
            .with_response(r#"{"translations": ["only one"]}"#.to_string());
        let speech = MockSpeechClient::new();

        let output = analyze_sales_potential(&text, &speech, &input(Some("ta")))
            .await
            .unwrap();

        assert_eq!(output.analysis, "Strong category.");
        assert_eq!(output.suggestions, "Mention the kiln.");
    }

    #[tokio::test]
    async fn test_speech_failure_propagates() {
        let text = MockTextClient::new().with_response(REPLY.to_string());
        let speech = MockSpeechClient::new().with_failure(true);

        let err = analyze_sales_potential(&text, &speech, &input(None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_price() {
        let text = MockTextClient::new();
        let speech = MockSpeechClient::new();

        let mut bad = input(None);
        bad.product_price = -1.0;
        let err = analyze_sales_potential(&text, &speech, &bad)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(text.get_call_count(), 0);
    }
}
