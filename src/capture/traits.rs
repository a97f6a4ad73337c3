//! Capture trait definitions
//!
//! Platform-agnostic handles for live camera/microphone streams and the
//! backend trait that opens them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Capture-related errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Device not available: {0}")]
    DeviceUnavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No supported format among: {0:?}")]
    NoSupportedFormat(Vec<String>),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Stream has no live tracks")]
    StreamEnded,

    #[error("Recorder task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// What to ask the backend for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    pub video: bool,
    pub audio: bool,
    /// Specific camera to open (None = default camera)
    pub camera_id: Option<String>,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            camera_id: None,
        }
    }
}

/// A single audio or video track of a live stream
#[derive(Debug)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
    live: AtomicBool,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            live: AtomicBool::new(true),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop the track. Returns whether it was still live.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::SeqCst)
    }
}

/// Handle to a live capture stream
///
/// Clones share the same tracks, so stopping through any clone stops the
/// stream for every holder.
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: Uuid,
    tracks: Arc<Vec<MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks: Arc::new(tracks),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn has_track(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind() == kind)
    }

    /// Whether any track is still delivering media
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track, returning how many were still live
    pub fn stop_all_tracks(&self) -> usize {
        self.tracks.iter().filter(|t| t.stop()).count()
    }
}

impl PartialEq for MediaStream {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaStream {}

/// Opens live streams from camera/microphone hardware
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Open a stream satisfying the constraints
    async fn open(&self, constraints: &StreamConstraints) -> CaptureResult<MediaStream>;

    /// Release any backend-side resources after the tracks were stopped
    async fn close(&self, _stream: &MediaStream) {}
}
