//! Saved advertisements, kept as a JSON array on disk (newest first).

use crate::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAdvertisement {
    pub id: String,
    pub video_url: String,
    pub description: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

pub struct AdvertisementHistory {
    path: PathBuf,
}

impl AdvertisementHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<SavedAdvertisement>> {
        if !self.path.exists() {
            debug!("No history at {:?}", self.path);
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn save(&self, video_url: &str, description: &str) -> Result<SavedAdvertisement> {
        let now = Utc::now();
        let entry = SavedAdvertisement {
            id: format!("ad-{}", now.timestamp_millis()),
            video_url: video_url.to_string(),
            description: description.to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut entries = self.list().await?;
        entries.insert(0, entry.clone());
        self.write(&entries).await?;

        info!("Saved advertisement {}", entry.id);
        Ok(entry)
    }

    /// Returns whether an entry with `id` was removed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut entries = self.list().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);

        if entries.len() == before {
            return Ok(false);
        }
        self.write(&entries).await?;
        info!("Removed advertisement {}", id);
        Ok(true)
    }

    async fn write(&self, entries: &[SavedAdvertisement]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(entries)?).await?;
        Ok(())
    }
}
