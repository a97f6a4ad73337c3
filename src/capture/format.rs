//! Recording format negotiation

use serde::{Deserialize, Serialize};

/// Ordered mime type preferences, most preferred first
pub const DEFAULT_PREFERENCES: &[&str] = &[
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
    "video/mp4;codecs=h264,aac",
    "video/mp4",
];

/// Container of a finished recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Webm,
    Mp4,
}

impl Container {
    /// Get the file extension for this container
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Webm => "webm",
            Container::Mp4 => "mp4",
        }
    }

    /// Bare mime type of the container, without codecs
    pub fn mime_type(&self) -> &'static str {
        match self {
            Container::Webm => "video/webm",
            Container::Mp4 => "video/mp4",
        }
    }
}

/// A negotiated recording format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingFormat {
    /// Full mime type handed to the encoder, codecs included
    pub mime_type: String,
    pub container: Container,
}

impl RecordingFormat {
    /// Parse a mime type such as `video/webm;codecs=vp9,opus`
    pub fn parse(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next()?.trim().to_ascii_lowercase();
        let container = match essence.as_str() {
            "video/webm" => Container::Webm,
            "video/mp4" => Container::Mp4,
            _ => return None,
        };

        Some(Self {
            mime_type: mime_type.trim().to_string(),
            container,
        })
    }
}

/// Pick the first preference the encoder supports
///
/// Preferences whose container is unknown are skipped.
pub fn negotiate_format<S, F>(preferences: &[S], supported: F) -> Option<RecordingFormat>
where
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    preferences.iter().find_map(|candidate| {
        let candidate = candidate.as_ref();
        let Some(format) = RecordingFormat::parse(candidate) else {
            tracing::debug!("Skipping unrecognised recording format {}", candidate);
            return None;
        };
        supported(candidate).then_some(format)
    })
}
