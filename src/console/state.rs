//! Console state management
//!
//! Defines the source state machine, the capture session and the snapshot
//! handed to the presentation layer.

use crate::capture::{MediaStream, RecorderHandle, RecordingFormat};
use crate::library::{ActiveSource, LibraryItem, PlaylistEntry};
use crate::transport::{BoundSource, SourceDescriptor, TransportIntent, TransportStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which source is on screen, and whether the camera is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceState {
    /// Nothing selected yet
    #[default]
    Empty,
    PlayingLibraryItem,
    LiveViewing,
    LiveRecording,
}

impl SourceState {
    pub fn of(active: Option<&ActiveSource>, session: &CaptureSession) -> Self {
        match active {
            None => SourceState::Empty,
            Some(ActiveSource::Library(_)) => SourceState::PlayingLibraryItem,
            Some(ActiveSource::Live(_)) if session.is_recording() => SourceState::LiveRecording,
            Some(ActiveSource::Live(_)) => SourceState::LiveViewing,
        }
    }
}

/// Transport binding lifecycle
///
/// `AwaitingRelease` covers the window between asking the transport to drop
/// its source and it confirming; nothing may be bound during that window.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BindPhase {
    #[default]
    Unbound,
    AwaitingRelease,
    Bound(SourceDescriptor),
}

impl BindPhase {
    pub fn bound(&self) -> Option<&SourceDescriptor> {
        match self {
            BindPhase::Bound(source) => Some(source),
            _ => None,
        }
    }

    pub fn kind(&self) -> BindPhaseKind {
        match self {
            BindPhase::Unbound => BindPhaseKind::Unbound,
            BindPhase::AwaitingRelease => BindPhaseKind::AwaitingRelease,
            BindPhase::Bound(_) => BindPhaseKind::Bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindPhaseKind {
    #[default]
    Unbound,
    AwaitingRelease,
    Bound,
}

/// Live camera session
///
/// Owns the stream and recorder handles exclusively. A recorder only exists
/// on top of a stream, and recording implies the session is active.
#[derive(Default)]
pub struct CaptureSession {
    stream: Option<MediaStream>,
    is_active: bool,
    recorder: Option<RecorderHandle>,
    is_recording: bool,
}

impl CaptureSession {
    pub fn activated(stream: MediaStream) -> Self {
        Self {
            stream: Some(stream),
            is_active: true,
            recorder: None,
            is_recording: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    /// Attach a running recorder. Ignored unless a stream is held.
    pub fn begin_recording(&mut self, recorder: RecorderHandle) -> bool {
        if !self.is_active || self.stream.is_none() {
            return false;
        }
        self.recorder = Some(recorder);
        self.is_recording = true;
        true
    }

    /// Detach the recorder, clearing the recording flag
    pub fn end_recording(&mut self) -> Option<RecorderHandle> {
        self.is_recording = false;
        self.recorder.take()
    }

    /// Give up the stream, leaving an inactive session
    pub fn take_stream(&mut self) -> Option<MediaStream> {
        self.is_active = false;
        self.stream.take()
    }

    pub fn flags(&self) -> CaptureFlags {
        CaptureFlags {
            is_active: self.is_active,
            is_recording: self.is_recording,
            stream_id: self.stream.as_ref().map(MediaStream::id),
            format: self.recorder.as_ref().map(|r| r.format().clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureFlags {
    pub is_active: bool,
    pub is_recording: bool,
    pub stream_id: Option<Uuid>,
    pub format: Option<RecordingFormat>,
}

/// Read-only view of the console for rendering
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSnapshot {
    pub state: SourceState,
    pub active_source: Option<ActiveSource>,
    pub status: TransportStatus,
    /// `mm:ss`
    pub position_label: String,
    pub duration_label: String,
    pub intent: TransportIntent,
    pub capture: CaptureFlags,
    pub bound: Option<BoundSource>,
    pub bind_phase: BindPhaseKind,
    /// Stamp for transport notifications received now
    pub binding_generation: u64,
    pub is_fullscreen: bool,
    pub videos: Vec<LibraryItem>,
    pub playlist: Vec<PlaylistEntry>,
    pub progress_percent: u32,
    pub total_duration: String,
}
