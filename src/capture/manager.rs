//! Capture device manager
//!
//! Acquires and releases live camera+microphone streams and starts chunked
//! recorders against them. Holds no session state of its own; the console
//! coordinator owns every handle this returns.

use super::format::{negotiate_format, RecordingFormat};
use super::recorder::{MediaEncoder, RecorderCallbacks, RecorderHandle};
use super::traits::{
    CaptureBackend, CaptureError, CaptureResult, MediaStream, StreamConstraints, TrackKind,
};
use std::sync::Arc;
use std::time::Duration;

pub struct CaptureDeviceManager {
    backend: Arc<dyn CaptureBackend>,
    encoder: Arc<dyn MediaEncoder>,
    preferences: Vec<String>,
    timeslice: Duration,
}

impl CaptureDeviceManager {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        encoder: Arc<dyn MediaEncoder>,
        preferences: Vec<String>,
        timeslice: Duration,
    ) -> Self {
        Self {
            backend,
            encoder,
            preferences,
            timeslice,
        }
    }

    /// Acquire a stream carrying both audio and video
    pub async fn acquire(&self) -> CaptureResult<MediaStream> {
        let constraints = StreamConstraints::default();
        let stream = self.backend.open(&constraints).await?;

        for kind in [TrackKind::Video, TrackKind::Audio] {
            if !stream.has_track(kind) {
                self.release(&stream).await;
                return Err(CaptureError::DeviceUnavailable(format!(
                    "stream is missing a {kind:?} track"
                )));
            }
        }

        tracing::info!(
            "Acquired capture stream {} ({} tracks)",
            stream.id(),
            stream.tracks().len()
        );
        Ok(stream)
    }

    /// Stop every track of the stream. Safe to call more than once.
    pub async fn release(&self, stream: &MediaStream) {
        let stopped = stream.stop_all_tracks();
        if stopped == 0 {
            tracing::debug!("Capture stream {} already released", stream.id());
            return;
        }

        self.backend.close(stream).await;
        tracing::info!("Released capture stream {} ({} tracks stopped)", stream.id(), stopped);
    }

    /// Pick the first configured format the encoder supports
    pub fn negotiate(&self) -> CaptureResult<RecordingFormat> {
        negotiate_format(self.preferences.as_slice(), |mime| self.encoder.is_supported(mime))
            .ok_or_else(|| CaptureError::NoSupportedFormat(self.preferences.clone()))
    }

    /// Start a chunked recorder on the stream
    pub async fn record(
        &self,
        stream: &MediaStream,
        format: RecordingFormat,
        callbacks: RecorderCallbacks,
    ) -> CaptureResult<RecorderHandle> {
        RecorderHandle::start(self.encoder.as_ref(), stream, format, self.timeslice, callbacks)
            .await
    }
}
