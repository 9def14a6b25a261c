//! Shared Gemini payload types used across text and speech modules.

use crate::ai::mime::{is_data_uri, DataUri};
use crate::models::MediaRef;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// Untagged union of text, inline media, and remote media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

impl Part {
    /// Data URIs travel inline; anything else is referenced by URI.
    pub fn from_media(media: &MediaRef) -> Result<Self> {
        if is_data_uri(&media.url) {
            let decoded = DataUri::parse(&media.url)?;
            Ok(Part::InlineData {
                inline_data: InlineData {
                    mime_type: decoded.mime_type.clone(),
                    data: decoded.base64_payload(),
                },
            })
        } else {
            Ok(Part::FileData {
                file_data: FileData {
                    mime_type: media.content_type.clone(),
                    file_uri: media.url.clone(),
                },
            })
        }
    }
}

/// Base64 inline payload used for image/audio requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateContentResponse {
    pub fn first_text(&self) -> Option<String> {
        self.candidates.first().and_then(|c| {
            let text: String = c
                .content
                .parts
                .iter()
                .filter_map(|p| match p {
                    Part::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            (!text.is_empty()).then_some(text)
        })
    }

    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates.first().and_then(|c| {
            c.content.parts.iter().find_map(|p| match p {
                Part::InlineData { inline_data } => Some(inline_data),
                _ => None,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_from_data_uri_is_inline() {
        let media = MediaRef::new("data:image/png;base64,iVBORw==", "image/png");
        let json = serde_json::to_value(Part::from_media(&media).unwrap()).unwrap();

        assert_eq!(json["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["inlineData"]["data"], "iVBORw==");
    }

    #[test]
    fn test_part_from_remote_url_is_file_data() {
        let media = MediaRef::new("https://cdn.example.com/vase.jpg", "image/jpeg");
        let json = serde_json::to_value(Part::from_media(&media).unwrap()).unwrap();

        assert_eq!(json["fileData"]["fileUri"], "https://cdn.example.com/vase.jpg");
        assert_eq!(json["fileData"]["mimeType"], "image/jpeg");
    }

    #[test]
    fn test_first_text_joins_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"price\":" }, { "text": " 250}" }] }
            }]
        }))
        .unwrap();

        assert_eq!(response.first_text().unwrap(), "{\"price\": 250}");
    }
}
