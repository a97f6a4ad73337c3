//! Chunked recorder
//!
//! Runs an encoder against a live stream and flushes encoded data every
//! timeslice instead of once at the end. Chunks are buffered until `stop()`,
//! which assembles them into a single [`RecordingArtifact`].

use super::format::RecordingFormat;
use super::traits::{CaptureError, CaptureResult, MediaStream};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Encodes a live stream into a container format
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Whether the encoder can produce the given mime type
    fn is_supported(&self, mime_type: &str) -> bool;

    /// Begin encoding the stream
    async fn begin(
        &self,
        stream: &MediaStream,
        format: &RecordingFormat,
    ) -> CaptureResult<Box<dyn EncoderSession>>;
}

/// A running encode
#[async_trait]
pub trait EncoderSession: Send {
    /// Return everything encoded since the previous call
    async fn flush(&mut self) -> CaptureResult<Vec<u8>>;

    /// Stop encoding and return the remaining data
    async fn finish(&mut self) -> CaptureResult<Vec<u8>>;
}

/// Recorder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    #[default]
    Inactive,
    Recording,
}

/// One flushed slice of encoded data
#[derive(Debug, Clone)]
pub struct RecordedChunk {
    pub index: usize,
    pub data: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

/// A finished recording, ready to be handed to an artifact sink
#[derive(Debug, Clone)]
pub struct RecordingArtifact {
    pub recording_id: Uuid,
    pub format: RecordingFormat,
    pub data: Vec<u8>,
    pub chunk_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RecordingArtifact {
    /// File name offered for download, e.g.
    /// `webcam-recording-2024-01-05T10:20:30.123Z.webm`
    pub fn file_name(&self) -> String {
        format!(
            "webcam-recording-{}.{}",
            self.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.format.container.extension()
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub type ChunkCallback = Arc<dyn Fn(&RecordedChunk) + Send + Sync>;
pub type FinalizeCallback = Arc<dyn Fn(&RecordingArtifact) + Send + Sync>;

/// Hooks invoked from the recorder task
#[derive(Clone, Default)]
pub struct RecorderCallbacks {
    pub on_chunk: Option<ChunkCallback>,
    pub on_finalize: Option<FinalizeCallback>,
}

/// Handle to a running recorder
pub struct RecorderHandle {
    id: Uuid,
    format: RecordingFormat,
    state: Arc<RwLock<RecorderState>>,
    chunks: Arc<Mutex<Vec<RecordedChunk>>>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<CaptureResult<RecordingArtifact>>>,
}

impl RecorderHandle {
    /// Start recording the stream
    pub async fn start(
        encoder: &dyn MediaEncoder,
        stream: &MediaStream,
        format: RecordingFormat,
        timeslice: Duration,
        callbacks: RecorderCallbacks,
    ) -> CaptureResult<Self> {
        if !stream.is_active() {
            return Err(CaptureError::StreamEnded);
        }

        let session = encoder.begin(stream, &format).await?;

        let id = Uuid::new_v4();
        let state = Arc::new(RwLock::new(RecorderState::Recording));
        let chunks = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run_recorder(RecorderTask {
            id,
            format: format.clone(),
            timeslice,
            session,
            stop_rx,
            state: state.clone(),
            chunks: chunks.clone(),
            callbacks,
        }));

        tracing::info!(
            "Recorder {} started: {} (timeslice {}ms)",
            id,
            format.mime_type,
            timeslice.as_millis()
        );

        Ok(Self {
            id,
            format,
            state,
            chunks,
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn format(&self) -> &RecordingFormat {
        &self.format
    }

    pub fn state(&self) -> RecorderState {
        *self.state.read()
    }

    pub fn is_recording(&self) -> bool {
        self.state() == RecorderState::Recording
    }

    /// Chunks flushed so far and not yet assembled
    pub fn buffered_chunks(&self) -> usize {
        self.chunks.lock().len()
    }

    /// Stop recording and assemble the artifact
    ///
    /// Returns `Ok(None)` if the recorder was already stopped.
    pub async fn stop(&mut self) -> CaptureResult<Option<RecordingArtifact>> {
        let (Some(stop_tx), Some(task)) = (self.stop_tx.take(), self.task.take()) else {
            tracing::debug!("Recorder {} already stopped", self.id);
            return Ok(None);
        };

        // The task may have exited on its own after an encoder error
        let _ = stop_tx.send(());

        let artifact = task
            .await
            .map_err(|e| CaptureError::TaskFailed(e.to_string()))??;

        tracing::info!(
            "Recorder {} stopped: {} chunks, {} bytes",
            self.id,
            artifact.chunk_count,
            artifact.len()
        );
        Ok(Some(artifact))
    }
}

impl Drop for RecorderHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            tracing::warn!("Recorder {} dropped while recording, discarding data", self.id);
            task.abort();
        }
    }
}

struct RecorderTask {
    id: Uuid,
    format: RecordingFormat,
    timeslice: Duration,
    session: Box<dyn EncoderSession>,
    stop_rx: oneshot::Receiver<()>,
    state: Arc<RwLock<RecorderState>>,
    chunks: Arc<Mutex<Vec<RecordedChunk>>>,
    callbacks: RecorderCallbacks,
}

impl RecorderTask {
    fn push_chunk(&self, data: Vec<u8>) {
        if data.is_empty() {
            return;
        }

        let chunk = {
            let mut chunks = self.chunks.lock();
            let chunk = RecordedChunk {
                index: chunks.len(),
                data,
                captured_at: Utc::now(),
            };
            chunks.push(chunk.clone());
            chunk
        };

        tracing::trace!("Recorder {} chunk {} ({} bytes)", self.id, chunk.index, chunk.data.len());
        if let Some(on_chunk) = &self.callbacks.on_chunk {
            on_chunk(&chunk);
        }
    }

    /// Flush until stopped. An encoder error ends the recording early and is
    /// handed back next to the start time; chunks already flushed are kept.
    async fn record(&mut self) -> (DateTime<Utc>, Option<CaptureError>) {
        let started_at = Utc::now();
        let mut ticker = tokio::time::interval(self.timeslice);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut self.stop_rx => break,
                _ = ticker.tick() => match self.session.flush().await {
                    Ok(data) => self.push_chunk(data),
                    Err(e) => return (started_at, Some(e)),
                },
            }
        }

        match self.session.finish().await {
            Ok(tail) => {
                self.push_chunk(tail);
                (started_at, None)
            }
            Err(e) => (started_at, Some(e)),
        }
    }

    fn assemble(&self, started_at: DateTime<Utc>) -> RecordingArtifact {
        let chunks: Vec<RecordedChunk> = std::mem::take(&mut *self.chunks.lock());
        let chunk_count = chunks.len();
        let data = chunks.into_iter().flat_map(|c| c.data).collect();

        RecordingArtifact {
            recording_id: self.id,
            format: self.format.clone(),
            data,
            chunk_count,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

async fn run_recorder(mut task: RecorderTask) -> CaptureResult<RecordingArtifact> {
    let (started_at, failure) = task.record().await;
    *task.state.write() = RecorderState::Inactive;

    if let Some(e) = failure {
        let buffered = task.chunks.lock().len();
        if buffered == 0 {
            tracing::error!("Recorder {} failed before any data: {}", task.id, e);
            return Err(e);
        }
        tracing::warn!(
            "Recorder {} interrupted: {}; keeping {} chunks",
            task.id,
            e,
            buffered
        );
    }

    let artifact = task.assemble(started_at);
    if let Some(on_finalize) = &task.callbacks.on_finalize {
        on_finalize(&artifact);
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::format::Container;
    use crate::testing::{camera_stream, FakeEncoder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn webm() -> RecordingFormat {
        RecordingFormat::parse("video/webm;codecs=vp9,opus").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_flush_every_timeslice() {
        let encoder = FakeEncoder::supporting(&["video/webm;codecs=vp9,opus"]);
        let stream = camera_stream();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = seen.clone();
        let callbacks = RecorderCallbacks {
            on_chunk: Some(Arc::new(move |_chunk: &RecordedChunk| {
                seen_cb.fetch_add(1, Ordering::SeqCst);
            })),
            on_finalize: None,
        };

        let mut recorder =
            RecorderHandle::start(&encoder, &stream, webm(), Duration::from_secs(1), callbacks)
                .await
                .unwrap();
        assert!(recorder.is_recording());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(recorder.buffered_chunks(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        let artifact = recorder.stop().await.unwrap().unwrap();
        // Three periodic chunks plus the tail
        assert_eq!(artifact.chunk_count, 4);
        assert_eq!(artifact.data, b"chunk-0chunk-1chunk-2tail".to_vec());
        assert_eq!(artifact.format.container, Container::Webm);
        assert_eq!(recorder.state(), RecorderState::Inactive);
        assert_eq!(recorder.buffered_chunks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_is_noop() {
        let encoder = FakeEncoder::supporting(&["video/webm;codecs=vp9,opus"]);
        let stream = camera_stream();
        let finalized = Arc::new(AtomicUsize::new(0));
        let finalized_cb = finalized.clone();
        let callbacks = RecorderCallbacks {
            on_chunk: None,
            on_finalize: Some(Arc::new(move |_a: &RecordingArtifact| {
                finalized_cb.fetch_add(1, Ordering::SeqCst);
            })),
        };

        let mut recorder =
            RecorderHandle::start(&encoder, &stream, webm(), Duration::from_secs(1), callbacks)
                .await
                .unwrap();

        assert!(recorder.stop().await.unwrap().is_some());
        assert!(recorder.stop().await.unwrap().is_none());
        assert_eq!(finalized.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_encoder_failure_keeps_flushed_chunks() {
        let encoder = FakeEncoder::failing_after(&["video/webm;codecs=vp9,opus"], 2);
        let stream = camera_stream();
        let mut recorder = RecorderHandle::start(
            &encoder,
            &stream,
            webm(),
            Duration::from_secs(1),
            RecorderCallbacks::default(),
        )
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(recorder.state(), RecorderState::Inactive);

        let artifact = recorder.stop().await.unwrap().unwrap();
        assert_eq!(artifact.chunk_count, 2);
        assert_eq!(artifact.data, b"chunk-0chunk-1".to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_encoder_failure_without_data_is_an_error() {
        let encoder = FakeEncoder::failing_after(&["video/webm;codecs=vp9,opus"], 0);
        let stream = camera_stream();
        let mut recorder = RecorderHandle::start(
            &encoder,
            &stream,
            webm(),
            Duration::from_secs(1),
            RecorderCallbacks::default(),
        )
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(matches!(recorder.stop().await, Err(CaptureError::Encoder(_))));
    }

    #[tokio::test]
    async fn test_refuses_ended_stream() {
        let encoder = FakeEncoder::supporting(&["video/webm"]);
        let stream = camera_stream();
        stream.stop_all_tracks();

        let result = RecorderHandle::start(
            &encoder,
            &stream,
            webm(),
            Duration::from_secs(1),
            RecorderCallbacks::default(),
        )
        .await;
        assert!(matches!(result, Err(CaptureError::StreamEnded)));
    }

    #[test]
    fn test_artifact_file_name() {
        let finished_at = DateTime::parse_from_rfc3339("2024-01-05T10:20:30.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let artifact = RecordingArtifact {
            recording_id: Uuid::new_v4(),
            format: RecordingFormat::parse("video/mp4").unwrap(),
            data: vec![1, 2, 3],
            chunk_count: 1,
            started_at: finished_at,
            finished_at,
        };
        assert_eq!(
            artifact.file_name(),
            "webcam-recording-2024-01-05T10:20:30.123Z.mp4"
        );
    }
}
