use crate::{Error, Result};
use base64::Engine as _;

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

/// A decoded `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl DataUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidInput("not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidInput("data URI has no payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidInput("only base64 data URIs are supported".to_string()))?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidInput(format!("invalid base64 in data URI: {}", e)))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    pub fn encode(mime_type: &str, data: &[u8]) -> String {
        format!(
            "data:{};base64,{}",
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(data)
        )
    }

    /// The payload re-encoded as plain base64, as Gemini expects for inline data.
    pub fn base64_payload(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

pub fn is_data_uri(url: &str) -> bool {
    url.starts_with("data:")
}
