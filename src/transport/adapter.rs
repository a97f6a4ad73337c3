//! Playback transport contract
//!
//! The rendering surface is external. The console only talks to it through
//! [`TransportAdapter`] and listens to the [`TransportEvent`]s it emits.

use crate::capture::MediaStream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Transport-related errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Source rejected: {0}")]
    SourceRejected(String),

    #[error("Playback blocked: {0}")]
    PlaybackBlocked(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// What the transport is asked to render
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDescriptor {
    /// A library file
    Url { url: String, poster: Option<String> },
    /// A live capture stream
    Stream(MediaStream),
}

impl SourceDescriptor {
    /// Serializable summary used in snapshots
    pub fn summary(&self) -> BoundSource {
        match self {
            SourceDescriptor::Url { url, .. } => BoundSource::Url { url: url.clone() },
            SourceDescriptor::Stream(stream) => BoundSource::Stream {
                stream_id: stream.id(),
            },
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SourceDescriptor::Stream(_))
    }
}

/// The resource currently held by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoundSource {
    Url { url: String },
    #[serde(rename_all = "camelCase")]
    Stream { stream_id: Uuid },
}

/// Timing and lifecycle notifications from the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Started,
    Stopped,
    VolumeChanged(f64),
    PositionChanged(f64),
    DurationKnown(f64),
    Ended,
}

/// Native playback surface
///
/// Completion of a call does not mean the surface is playing; `is_playing`
/// is reconciled from [`TransportEvent::Started`]/[`TransportEvent::Stopped`].
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    async fn bind(&self, source: &SourceDescriptor) -> TransportResult<()>;

    /// Resolves once the surface has released the previous source
    async fn unbind(&self) -> TransportResult<()>;

    async fn play(&self) -> TransportResult<()>;

    async fn pause(&self) -> TransportResult<()>;

    async fn seek(&self, seconds: f64) -> TransportResult<()>;

    async fn set_volume(&self, volume: f64) -> TransportResult<()>;

    async fn enter_fullscreen(&self) -> TransportResult<()>;

    async fn exit_fullscreen(&self) -> TransportResult<()>;
}
