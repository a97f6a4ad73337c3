//! In-memory collaborators for unit tests

use crate::capture::{
    ArtifactSink, CaptureBackend, CaptureError, CaptureResult, EncoderSession, MediaEncoder,
    MediaStream, MediaTrack, RecordingArtifact, RecordingFormat, StreamConstraints, TrackKind,
};
use crate::config::ConsoleConfig;
use crate::console::{ConsoleDeps, Coordinator, SourceState};
use crate::library::{Library, LibraryItem};
use crate::store::{
    save_state, KeyValueStore, MemoryStore, PersistedState, StoreError, StoreResult,
};
use crate::transport::{
    BoundSource, SourceDescriptor, TransportAdapter, TransportError, TransportResult,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn camera_stream() -> MediaStream {
    MediaStream::new(vec![
        MediaTrack::new(TrackKind::Video, "Test Camera"),
        MediaTrack::new(TrackKind::Audio, "Test Microphone"),
    ])
}

/// Three ten-minute items with ids 1, 2, 3 titled A, B, C
pub fn abc_library() -> Library {
    Library::new(
        ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, title)| LibraryItem {
                id: i as u32 + 1,
                title: title.to_string(),
                source_url: format!("https://media.test/{title}.mp4"),
                thumbnail_url: String::new(),
                duration_minutes: 10,
                completed: false,
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Bind(BoundSource),
    Unbind,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    EnterFullscreen,
    ExitFullscreen,
}

#[derive(Default)]
struct TransportInner {
    calls: Vec<TransportCall>,
    bound: Option<BoundSource>,
    held: usize,
    max_held: usize,
}

/// Records every call; `unbind` takes a few milliseconds to confirm
#[derive(Default)]
pub struct FakeTransport {
    inner: Mutex<TransportInner>,
    fail_bind: AtomicBool,
    fail_play: AtomicBool,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().calls.clone()
    }

    pub fn bound(&self) -> Option<BoundSource> {
        self.inner.lock().bound.clone()
    }

    /// Most sources ever held at once
    pub fn max_concurrent_binds(&self) -> usize {
        self.inner.lock().max_held
    }

    pub fn set_fail_bind(&self, fail: bool) {
        self.fail_bind.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: TransportCall) {
        self.inner.lock().calls.push(call);
    }
}

#[async_trait]
impl TransportAdapter for FakeTransport {
    async fn bind(&self, source: &SourceDescriptor) -> TransportResult<()> {
        {
            let mut inner = self.inner.lock();
            let summary = source.summary();
            inner.calls.push(TransportCall::Bind(summary.clone()));
            inner.held += 1;
            inner.max_held = inner.max_held.max(inner.held);
            inner.bound = Some(summary);
        }
        if self.fail_bind.load(Ordering::SeqCst) {
            return Err(TransportError::SourceRejected("unsupported media".into()));
        }
        Ok(())
    }

    async fn unbind(&self) -> TransportResult<()> {
        self.record(TransportCall::Unbind);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let mut inner = self.inner.lock();
        inner.held = inner.held.saturating_sub(1);
        inner.bound = None;
        Ok(())
    }

    async fn play(&self) -> TransportResult<()> {
        self.record(TransportCall::Play);
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(TransportError::PlaybackBlocked("autoplay refused".into()));
        }
        Ok(())
    }

    async fn pause(&self) -> TransportResult<()> {
        self.record(TransportCall::Pause);
        Ok(())
    }

    async fn seek(&self, seconds: f64) -> TransportResult<()> {
        self.record(TransportCall::Seek(seconds));
        Ok(())
    }

    async fn set_volume(&self, volume: f64) -> TransportResult<()> {
        self.record(TransportCall::SetVolume(volume));
        Ok(())
    }

    async fn enter_fullscreen(&self) -> TransportResult<()> {
        self.record(TransportCall::EnterFullscreen);
        Ok(())
    }

    async fn exit_fullscreen(&self) -> TransportResult<()> {
        self.record(TransportCall::ExitFullscreen);
        Ok(())
    }
}

#[derive(Default, Clone, Copy)]
enum CameraMode {
    #[default]
    Working,
    Denying,
    VideoOnly,
}

#[derive(Default)]
pub struct FakeCamera {
    mode: CameraMode,
    opened: Mutex<Vec<MediaStream>>,
    closed: AtomicUsize,
}

impl FakeCamera {
    pub fn denying() -> Self {
        Self {
            mode: CameraMode::Denying,
            ..Self::default()
        }
    }

    pub fn video_only() -> Self {
        Self {
            mode: CameraMode::VideoOnly,
            ..Self::default()
        }
    }

    /// Every stream handed out so far
    pub fn opened(&self) -> Vec<MediaStream> {
        self.opened.lock().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureBackend for FakeCamera {
    async fn open(&self, _constraints: &StreamConstraints) -> CaptureResult<MediaStream> {
        let stream = match self.mode {
            CameraMode::Working => camera_stream(),
            CameraMode::VideoOnly => {
                MediaStream::new(vec![MediaTrack::new(TrackKind::Video, "Test Camera")])
            }
            CameraMode::Denying => {
                return Err(CaptureError::PermissionDenied("camera access denied".into()))
            }
        };
        self.opened.lock().push(stream.clone());
        Ok(stream)
    }

    async fn close(&self, _stream: &MediaStream) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Produces `chunk-N` on every flush and `tail` on finish
pub struct FakeEncoder {
    supported: Vec<String>,
    fail_after: Option<usize>,
}

impl FakeEncoder {
    pub fn supporting(mime_types: &[&str]) -> Self {
        Self {
            supported: mime_types.iter().map(|m| m.to_string()).collect(),
            fail_after: None,
        }
    }

    /// Every flush after the first `flushes` fails, as if the device vanished
    pub fn failing_after(mime_types: &[&str], flushes: usize) -> Self {
        Self {
            fail_after: Some(flushes),
            ..Self::supporting(mime_types)
        }
    }
}

#[async_trait]
impl MediaEncoder for FakeEncoder {
    fn is_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|m| m == mime_type)
    }

    async fn begin(
        &self,
        _stream: &MediaStream,
        _format: &RecordingFormat,
    ) -> CaptureResult<Box<dyn EncoderSession>> {
        Ok(Box::new(FakeSession {
            flushed: 0,
            fail_after: self.fail_after,
        }))
    }
}

struct FakeSession {
    flushed: usize,
    fail_after: Option<usize>,
}

#[async_trait]
impl EncoderSession for FakeSession {
    async fn flush(&mut self) -> CaptureResult<Vec<u8>> {
        if self.fail_after.is_some_and(|limit| self.flushed >= limit) {
            return Err(CaptureError::Encoder("device unplugged".into()));
        }
        let data = format!("chunk-{}", self.flushed).into_bytes();
        self.flushed += 1;
        Ok(data)
    }

    async fn finish(&mut self) -> CaptureResult<Vec<u8>> {
        if self.fail_after.is_some_and(|limit| self.flushed >= limit) {
            return Err(CaptureError::Encoder("device unplugged".into()));
        }
        Ok(b"tail".to_vec())
    }
}

/// Keeps delivered recordings in memory
#[derive(Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<RecordingArtifact>>,
}

impl MemorySink {
    pub fn artifacts(&self) -> Vec<RecordingArtifact> {
        self.artifacts.lock().clone()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn deliver(&self, artifact: &RecordingArtifact) -> CaptureResult<PathBuf> {
        self.artifacts.lock().push(artifact.clone());
        Ok(PathBuf::from("/downloads").join(artifact.file_name()))
    }
}

/// Storage that is never reachable
#[derive(Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable(format!("cannot read {key}")))
    }

    fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable(format!("cannot write {key}")))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable(format!("cannot remove {key}")))
    }
}

/// A coordinator's collaborators, kept around for inspection
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub camera: Arc<FakeCamera>,
    pub encoder: Arc<FakeEncoder>,
    pub sink: Arc<MemorySink>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    /// Fresh collaborators with `library` already persisted
    pub fn with_library(library: Library) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = PersistedState {
            videos: library,
            playlist: Vec::new(),
            current_video: None,
            volume: 1.0,
            comments: BTreeMap::new(),
            ratings: BTreeMap::new(),
        };
        save_state(store.as_ref(), &state).unwrap();

        Self {
            transport: Arc::new(FakeTransport::default()),
            camera: Arc::new(FakeCamera::default()),
            encoder: Arc::new(FakeEncoder::supporting(&[
                "video/webm;codecs=vp9,opus",
                "video/webm",
            ])),
            sink: Arc::new(MemorySink::default()),
            store,
        }
    }

    pub fn denying_camera(mut self) -> Self {
        self.camera = Arc::new(FakeCamera::denying());
        self
    }

    pub fn with_encoder(mut self, encoder: FakeEncoder) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn coordinator(&self) -> Coordinator {
        self.coordinator_with_store(self.store.clone())
    }

    pub fn coordinator_with_store(&self, store: Arc<dyn KeyValueStore>) -> Coordinator {
        let deps = ConsoleDeps {
            transport: self.transport.clone(),
            capture_backend: self.camera.clone(),
            encoder: self.encoder.clone(),
            sink: self.sink.clone(),
            store,
        };
        Coordinator::new(deps, ConsoleConfig::default())
    }
}

/// Check the invariants that must hold between operations
pub fn assert_consistent(console: &Coordinator, transport: &FakeTransport) {
    let snapshot = console.snapshot();

    assert_eq!(
        transport.bound(),
        console.bound_source().map(SourceDescriptor::summary),
        "transport and coordinator disagree on the bound source"
    );
    assert_eq!(transport.bound(), snapshot.bound);
    assert!(transport.max_concurrent_binds() <= 1, "two sources were bound at once");

    if snapshot.capture.is_recording {
        assert!(snapshot.capture.is_active, "recording without an active session");
    }
    let live = matches!(
        snapshot.state,
        SourceState::LiveViewing | SourceState::LiveRecording
    );
    assert_eq!(live, snapshot.capture.is_active);
}
