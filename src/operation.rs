//! Long-running generation jobs as seen by the caller.
//!
//! An [`Operation`] is a snapshot of a remote job. It is never mutated in
//! place: a fresh snapshot only comes from re-querying the service.

use crate::models::MediaRef;
use serde::{Deserialize, Serialize};

/// Opaque input submitted to a generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub reference_media: Vec<MediaRef>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_media: Vec::new(),
        }
    }

    pub fn with_reference_media(mut self, media: Vec<MediaRef>) -> Self {
        self.reference_media = media;
        self
    }
}

/// One piece of a finished operation's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultPart {
    Text {
        text: String,
    },
    Media {
        #[serde(rename = "contentType")]
        content_type: String,
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    pub code: Option<i32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Service-side handle used to re-query status.
    pub name: String,
    pub done: bool,
    pub result: Option<Vec<ResultPart>>,
    pub error: Option<OperationError>,
}

impl Operation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            result: None,
            error: None,
        }
    }

    pub fn succeeded(name: impl Into<String>, parts: Vec<ResultPart>) -> Self {
        Self {
            name: name.into(),
            done: true,
            result: Some(parts),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            result: None,
            error: Some(OperationError {
                code,
                message: message.into(),
            }),
        }
    }

    /// First media part whose MIME type starts with `prefix`.
    ///
    /// Returns `None` while the operation is pending.
    pub fn find_media(&self, prefix: &str) -> Option<(&str, &str)> {
        if !self.done {
            return None;
        }
        self.result.as_deref()?.iter().find_map(|part| match part {
            ResultPart::Media { content_type, url } if content_type.starts_with(prefix) => {
                Some((content_type.as_str(), url.as_str()))
            }
            _ => None,
        })
    }
}

/// Media located in a finished operation, paired with a caller description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMedia {
    pub url: String,
    pub content_type: String,
    pub description: String,
}
