//! Library schema definitions
//!
//! Field names follow the persisted JSON layout (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Library Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: u32,
    pub title: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    /// Nominal length shown in the list, in minutes
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub completed: bool,
}

/// Fields supplied when appending a video; the id is assigned by the library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub source_url: String,
    pub thumbnail_url: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: u32,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// 1 to 5
    pub score: u8,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Source Types
// =============================================================================

pub const LIVE_SOURCE_ID: &str = "webcam";

/// Pseudo-item standing in for the camera feed while capture is active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCaptureSource {
    pub id: String,
    pub title: String,
    pub is_live: bool,
}

impl Default for LiveCaptureSource {
    fn default() -> Self {
        Self {
            id: LIVE_SOURCE_ID.to_string(),
            title: "Webcam".to_string(),
            is_live: true,
        }
    }
}

/// What is on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActiveSource {
    Library(LibraryItem),
    Live(LiveCaptureSource),
}

impl ActiveSource {
    pub fn is_live(&self) -> bool {
        matches!(self, ActiveSource::Live(_))
    }

    pub fn library_item(&self) -> Option<&LibraryItem> {
        match self {
            ActiveSource::Library(item) => Some(item),
            ActiveSource::Live(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ActiveSource::Library(item) => &item.title,
            ActiveSource::Live(live) => &live.title,
        }
    }
}

// =============================================================================
// Seed Data
// =============================================================================

const SAMPLE_BUCKET: &str = "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample";
const SAMPLE_IMAGES: &str = "https://storage.googleapis.com/gtv-videos-bucket/sample/images";

/// Library shipped with a fresh install
pub fn seed_videos() -> Vec<LibraryItem> {
    [
        (1, "Big Buck Bunny", "BigBuckBunny", 15, true),
        (2, "Elephant Dream", "ElephantsDream", 12, false),
        (3, "Sintel", "Sintel", 18, false),
    ]
    .into_iter()
    .map(|(id, title, stem, duration_minutes, completed)| LibraryItem {
        id,
        title: title.to_string(),
        source_url: format!("{SAMPLE_BUCKET}/{stem}.mp4"),
        thumbnail_url: format!("{SAMPLE_IMAGES}/{stem}.jpg"),
        duration_minutes,
        completed,
    })
    .collect()
}

pub fn seed_playlist() -> Vec<PlaylistEntry> {
    (1..=3)
        .map(|id| PlaylistEntry {
            id,
            title: format!("Sample Video {id}"),
            url: format!("https://example.com/video{id}.mp4"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_json_layout() {
        let item = seed_videos().remove(1);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["duration"], 12);
        assert_eq!(
            json["url"],
            "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4"
        );
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn test_active_source_tagging() {
        let live = ActiveSource::Live(LiveCaptureSource::default());
        let json = serde_json::to_value(&live).unwrap();
        assert_eq!(json["kind"], "live");
        assert_eq!(json["id"], "webcam");
        assert!(live.is_live());
        assert_eq!(live.title(), "Webcam");
        assert!(live.library_item().is_none());
    }
}
