use crate::ai::{generate_json, TextGenerationService, TextRequest};
use crate::{prompts, Result};
use serde::Deserialize;

const TRANSLATOR_SYSTEM: &str =
    "You translate product listings and sales advice for Indian artisans. Reply with JSON only.";

#[derive(Debug, Deserialize)]
struct TranslationReply {
    translations: Vec<String>,
}

/// Translate `texts` into `target_language`, preserving order.
///
/// The model may return a different number of entries; callers decide what
/// to do with a mismatch.
pub async fn translate_texts(
    text: &dyn TextGenerationService,
    texts: &[String],
    target_language: &str,
) -> Result<Vec<String>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let prompt = prompts::render(
        prompts::TRANSLATE,
        &[
            ("language", target_language),
            ("texts", &serde_json::to_string_pretty(texts)?),
        ],
    );

    let request = TextRequest::new(prompt).with_system(TRANSLATOR_SYSTEM);
    let reply: TranslationReply = generate_json(text, request).await?;
    tracing::debug!(
        "Translated {} text(s) into {}",
        reply.translations.len(),
        target_language
    );
    Ok(reply.translations)
}
