//! Source & transport coordinator
//!
//! The single owner of console state. Decides what the transport is bound to,
//! runs the camera session and its recorder, and keeps the library and
//! persisted state in step. Every mutation goes through a method on
//! [`Coordinator`]; adapters and capture backends only execute and report.

use super::events::ConsoleEvent;
use super::state::{BindPhase, CaptureSession, ConsoleSnapshot, SourceState};
use crate::capture::{
    ArtifactSink, CaptureBackend, CaptureDeviceManager, DirectorySink, MediaEncoder,
    RecordedChunk, RecorderCallbacks,
};
use crate::config::ConsoleConfig;
use crate::library::{
    seed_playlist, ActiveSource, Comment, Library, LibraryItem, LiveCaptureSource, NewVideo,
    PlaylistEntry, Rating,
};
use crate::store::{self, FileStore, KeyValueStore, PersistedState};
use crate::transport::{
    clamp_volume, SourceDescriptor, TransportAdapter, TransportError, TransportEvent,
    TransportIntent, TransportStatus,
};
use crate::utils::error::{ConsoleError, ConsoleResult, ErrorResponse};
use crate::utils::format::format_time;
use anyhow::Context;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// External collaborators the coordinator drives
pub struct ConsoleDeps {
    pub transport: Arc<dyn TransportAdapter>,
    pub capture_backend: Arc<dyn CaptureBackend>,
    pub encoder: Arc<dyn MediaEncoder>,
    pub sink: Arc<dyn ArtifactSink>,
    pub store: Arc<dyn KeyValueStore>,
}

impl ConsoleDeps {
    /// File-backed store and recording directory taken from the config
    ///
    /// Recordings go to `recording.output_directory`, else the user's
    /// download directory.
    pub fn from_config(
        config: &ConsoleConfig,
        transport: Arc<dyn TransportAdapter>,
        capture_backend: Arc<dyn CaptureBackend>,
        encoder: Arc<dyn MediaEncoder>,
    ) -> anyhow::Result<Self> {
        let storage_dir = config.storage_dir()?;
        let sink = match &config.recording.output_directory {
            Some(dir) => DirectorySink::new(dir.clone()),
            None => DirectorySink::downloads().context("No download directory available")?,
        };
        tracing::info!(
            "State in {:?}, recordings to {:?}",
            storage_dir,
            sink.dir()
        );

        Ok(Self {
            transport,
            capture_backend,
            encoder,
            sink: Arc::new(sink),
            store: Arc::new(FileStore::new(storage_dir)),
        })
    }
}

pub struct Coordinator {
    config: ConsoleConfig,
    transport: Arc<dyn TransportAdapter>,
    capture: CaptureDeviceManager,
    sink: Arc<dyn ArtifactSink>,
    store: Arc<dyn KeyValueStore>,

    library: Library,
    playlist: Vec<PlaylistEntry>,
    comments: BTreeMap<u32, Vec<Comment>>,
    ratings: BTreeMap<u32, Vec<Rating>>,
    /// Source that was on screen when the state was last persisted
    restored_current: Option<LibraryItem>,
    /// Last library item put on screen; the store only mirrors it
    last_selected: Option<u32>,

    active: Option<ActiveSource>,
    status: TransportStatus,
    intent: TransportIntent,
    session: CaptureSession,
    binding: BindPhase,
    /// Bumped on every bind; events stamped with an older value are stale
    binding_generation: u64,
    is_fullscreen: bool,

    snapshot: Arc<RwLock<ConsoleSnapshot>>,
    event_tx: broadcast::Sender<ConsoleEvent>,
}

impl Coordinator {
    /// Create a coordinator, restoring persisted state
    ///
    /// Nothing is bound until [`Coordinator::start`] runs.
    pub fn new(deps: ConsoleDeps, config: ConsoleConfig) -> Self {
        let capture = CaptureDeviceManager::new(
            deps.capture_backend,
            deps.encoder,
            config.recording.preferred_formats.clone(),
            config.timeslice(),
        );
        let volume = clamp_volume(config.playback.initial_volume);
        let (event_tx, _) = broadcast::channel(100);

        let mut coordinator = Self {
            config,
            transport: deps.transport,
            capture,
            sink: deps.sink,
            store: deps.store,
            library: Library::seeded(),
            playlist: seed_playlist(),
            comments: BTreeMap::new(),
            ratings: BTreeMap::new(),
            restored_current: None,
            last_selected: None,
            active: None,
            status: TransportStatus {
                volume,
                ..TransportStatus::default()
            },
            intent: TransportIntent {
                playing: false,
                volume,
            },
            session: CaptureSession::default(),
            binding: BindPhase::Unbound,
            binding_generation: 0,
            is_fullscreen: false,
            snapshot: Arc::new(RwLock::new(ConsoleSnapshot::default())),
            event_tx,
        };
        coordinator.restore();
        coordinator.publish();
        coordinator
    }

    fn restore(&mut self) {
        match store::load_state(self.store.as_ref()) {
            Ok(Some(state)) => {
                tracing::info!("Restored {} library items", state.videos.len());
                self.library = state.videos;
                self.playlist = state.playlist;
                self.comments = state.comments;
                self.ratings = state.ratings;
                self.restored_current = state
                    .current_video
                    .as_ref()
                    .and_then(ActiveSource::library_item)
                    .cloned();

                let volume = clamp_volume(state.volume);
                self.status.volume = volume;
                self.intent.volume = volume;
            }
            Ok(None) => tracing::debug!("No persisted state, starting from the seed library"),
            Err(e) => tracing::warn!(
                "{}; continuing without it",
                ConsoleError::from(e)
            ),
        }

        match store::load_last_selected(self.store.as_ref()) {
            Ok(id) => self.last_selected = id,
            Err(e) => tracing::warn!("{}", ConsoleError::from(e)),
        }
    }

    /// Select the initial item: the last selection, else the source persisted
    /// with the state, else the first library item. Never autoplays.
    pub async fn start(&mut self) -> ConsoleResult<()> {
        if self.active.is_some() || self.session.is_active() {
            return Ok(());
        }

        let initial = self
            .last_selected_item()
            .or_else(|| {
                self.restored_current
                    .as_ref()
                    .and_then(|item| self.library.get(item.id))
                    .cloned()
            })
            .or_else(|| self.library.first().cloned());

        match initial {
            Some(item) => self.select_item(item.id, false).await,
            None => {
                tracing::info!("Library is empty, nothing to select");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Source selection
    // =========================================================================

    /// Put a library item on screen
    ///
    /// An active camera session is torn down first (a running recording is
    /// finalized and delivered). Bind failures are reported as a notice and
    /// leave the item selected but paused.
    pub async fn select_item(&mut self, item_id: u32, autoplay: bool) -> ConsoleResult<()> {
        let item = self
            .library
            .get(item_id)
            .cloned()
            .ok_or(ConsoleError::UnknownItem(item_id))?;

        tracing::info!(
            "Selecting '{}' (id {}, autoplay {})",
            item.title,
            item.id,
            autoplay
        );

        if self.session.is_active() {
            self.teardown_capture().await;
        }

        self.active = Some(ActiveSource::Library(item.clone()));
        self.intent.playing = autoplay;
        self.status.is_playing = autoplay;
        self.status.reset_timing();
        self.remember_selection(item.id);
        self.persist();
        self.publish();
        self.emit(ConsoleEvent::SourceChanged(self.active.clone()));

        self.rebind(Some(url_source(&item)), autoplay).await;
        Ok(())
    }

    /// Advance to the next library item, wrapping around
    ///
    /// Ignored while the camera is on screen.
    pub async fn play_next(&mut self) -> ConsoleResult<()> {
        if self.session.is_active() || self.active.as_ref().is_some_and(ActiveSource::is_live) {
            tracing::debug!("Ignoring play_next while the camera is active");
            return Ok(());
        }

        let current = self
            .active
            .as_ref()
            .and_then(ActiveSource::library_item)
            .map(|item| item.id);

        let Some(next) = self.library.next_after(current).map(|item| item.id) else {
            tracing::debug!("Library is empty, nothing to play next");
            return Ok(());
        };

        self.select_item(next, true).await
    }

    // =========================================================================
    // Camera
    // =========================================================================

    /// Switch between the camera feed and the library
    ///
    /// Turning the camera on fails with `DeviceUnavailable` and leaves the
    /// console untouched when the device cannot be acquired. Turning it off
    /// finalizes any recording and returns to the last selected item.
    pub async fn toggle_capture(&mut self) -> ConsoleResult<()> {
        if self.session.is_active() {
            self.deactivate_capture().await;
            Ok(())
        } else {
            self.activate_capture().await
        }
    }

    async fn activate_capture(&mut self) -> ConsoleResult<()> {
        let stream = match self.capture.acquire().await {
            Ok(stream) => stream,
            Err(e) => {
                let error = match ConsoleError::from(e) {
                    error @ ConsoleError::DeviceUnavailable(_) => error,
                    other => ConsoleError::DeviceUnavailable(other.to_string()),
                };
                return Err(self.fail(error));
            }
        };

        tracing::info!("Camera on, stream {}", stream.id());
        self.session = CaptureSession::activated(stream.clone());
        self.active = Some(ActiveSource::Live(LiveCaptureSource::default()));
        self.intent.playing = true;
        self.status.is_playing = true;
        self.status.reset_timing();
        self.persist();
        self.publish();
        self.emit(ConsoleEvent::SourceChanged(self.active.clone()));
        self.emit(ConsoleEvent::CaptureChanged(self.session.flags()));

        self.rebind(Some(SourceDescriptor::Stream(stream)), true).await;
        Ok(())
    }

    async fn deactivate_capture(&mut self) {
        self.teardown_capture().await;

        let restored = self.last_selected_item();
        tracing::info!(
            "Camera off, returning to {}",
            restored
                .as_ref()
                .map(|item| item.title.as_str())
                .unwrap_or("nothing")
        );

        self.active = restored.clone().map(ActiveSource::Library);
        self.intent.playing = false;
        self.status.is_playing = false;
        self.status.reset_timing();
        self.persist();
        self.publish();
        self.emit(ConsoleEvent::SourceChanged(self.active.clone()));

        self.rebind(restored.as_ref().map(url_source), false).await;
    }

    /// Finalize any recording and release the stream
    async fn teardown_capture(&mut self) {
        if self.session.is_recording() {
            if let Err(e) = self.stop_recording().await {
                tracing::warn!("Recording lost during camera teardown: {}", e);
            }
        }

        if let Some(stream) = self.session.take_stream() {
            self.capture.release(&stream).await;
        }
        self.session = CaptureSession::default();
        self.publish();
        self.emit(ConsoleEvent::CaptureChanged(self.session.flags()));
    }

    /// Release everything the console holds
    ///
    /// Finalizes a running recording, closes the camera and unbinds the
    /// transport. The library selection is kept for the next start.
    pub async fn shutdown(&mut self) {
        if self.session.is_active() {
            self.teardown_capture().await;
        }
        if self.active.as_ref().is_some_and(ActiveSource::is_live) {
            self.active = None;
        }

        if self.binding != BindPhase::Unbound {
            self.binding = BindPhase::AwaitingRelease;
            self.publish();
            if let Err(e) = self.transport.unbind().await {
                tracing::warn!("Transport unbind failed: {}", e);
            }
            self.binding = BindPhase::Unbound;
        }

        self.intent.playing = false;
        self.status.is_playing = false;
        self.persist();
        self.publish();
        tracing::info!("Console shut down");
    }

    /// Start recording the camera feed. Ignored unless the camera is on.
    pub async fn start_recording(&mut self) -> ConsoleResult<()> {
        if !self.session.is_active() {
            tracing::debug!("Ignoring start_recording: camera is off");
            return Ok(());
        }
        if self.session.is_recording() {
            tracing::debug!("Ignoring start_recording: already recording");
            return Ok(());
        }
        let Some(stream) = self.session.stream().cloned() else {
            return Ok(());
        };

        let format = self.capture.negotiate().map_err(|e| self.fail(e))?;

        let events = self.event_tx.clone();
        let callbacks = RecorderCallbacks {
            on_chunk: Some(Arc::new(move |chunk: &RecordedChunk| {
                let _ = events.send(ConsoleEvent::ChunkRecorded {
                    index: chunk.index,
                    bytes: chunk.data.len(),
                });
            })),
            on_finalize: None,
        };

        let recorder = match self.capture.record(&stream, format, callbacks).await {
            Ok(recorder) => recorder,
            Err(e) => return Err(self.fail(e)),
        };

        self.session.begin_recording(recorder);
        self.publish();
        self.emit(ConsoleEvent::CaptureChanged(self.session.flags()));
        Ok(())
    }

    /// Stop recording and deliver the file
    ///
    /// Returns where the recording was delivered, or `None` when nothing was
    /// recording.
    pub async fn stop_recording(&mut self) -> ConsoleResult<Option<PathBuf>> {
        if !self.session.is_recording() {
            tracing::debug!("Ignoring stop_recording: not recording");
            return Ok(None);
        }

        let recorder = self.session.end_recording();
        self.publish();
        self.emit(ConsoleEvent::CaptureChanged(self.session.flags()));

        let Some(mut recorder) = recorder else {
            return Ok(None);
        };

        let artifact = match recorder.stop().await {
            Ok(Some(artifact)) => artifact,
            Ok(None) => return Ok(None),
            Err(e) => return Err(self.fail(e)),
        };

        match self.sink.deliver(&artifact).await {
            Ok(path) => {
                self.emit(ConsoleEvent::RecordingSaved {
                    path: path.clone(),
                    bytes: artifact.len(),
                });
                Ok(Some(path))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Fold a notification the transport emitted while binding `generation`
    /// was current. Notifications from an earlier binding are dropped.
    pub async fn handle_transport_event_for(&mut self, generation: u64, event: TransportEvent) {
        if generation != self.binding_generation {
            tracing::debug!(
                "Dropping {:?} from binding {} (current {})",
                event,
                generation,
                self.binding_generation
            );
            return;
        }
        self.handle_transport_event(event).await
    }

    /// Fold a transport notification into the status
    ///
    /// `Ended` advances the queue unless the camera is on screen.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        if self.binding.bound().is_none() {
            tracing::trace!("Dropping {:?}: nothing bound", event);
            return;
        }

        if event == TransportEvent::Ended {
            if self.session.is_active() {
                tracing::debug!("Ignoring end of stream while the camera is active");
                return;
            }
            self.status.apply(&event);
            if let Err(e) = self.play_next().await {
                tracing::warn!("Auto-advance failed: {}", e);
            }
            return;
        }

        if !self.status.apply(&event) {
            return;
        }
        if let TransportEvent::VolumeChanged(_) = event {
            self.intent.volume = self.status.volume;
            self.persist();
        }
        self.publish();
        self.emit(ConsoleEvent::TransportChanged(self.status));
    }

    pub async fn play(&mut self) -> ConsoleResult<()> {
        if self.binding.bound().is_none() {
            tracing::debug!("Ignoring play: nothing bound");
            return Ok(());
        }

        self.intent.playing = true;
        self.publish();
        match self.transport.play().await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.playback_failed(e)),
        }
    }

    pub async fn pause(&mut self) -> ConsoleResult<()> {
        if self.binding.bound().is_none() {
            tracing::debug!("Ignoring pause: nothing bound");
            return Ok(());
        }

        self.intent.playing = false;
        self.publish();
        self.transport.pause().await.map_err(|e| self.fail(e))
    }

    /// Seek within the bound library item, clamped to its duration
    pub async fn seek(&mut self, seconds: f64) -> ConsoleResult<()> {
        match self.binding.bound() {
            None => {
                tracing::debug!("Ignoring seek: nothing bound");
                return Ok(());
            }
            Some(source) if source.is_live() => {
                tracing::debug!("Ignoring seek on a live stream");
                return Ok(());
            }
            Some(_) => {}
        }

        let target = self.status.clamp_seek(seconds);
        self.transport.seek(target).await.map_err(|e| self.fail(e))
    }

    /// Seek relative to the current position
    pub async fn skip(&mut self, delta_seconds: f64) -> ConsoleResult<()> {
        self.seek(self.status.position_seconds + delta_seconds).await
    }

    pub async fn skip_forward(&mut self) -> ConsoleResult<()> {
        self.skip(self.config.playback.skip_seconds).await
    }

    pub async fn skip_backward(&mut self) -> ConsoleResult<()> {
        self.skip(-self.config.playback.skip_seconds).await
    }

    /// Set the volume, clamped to [0, 1]. Remembered even with nothing bound.
    pub async fn set_volume(&mut self, volume: f64) -> ConsoleResult<()> {
        let volume = clamp_volume(volume);
        self.intent.volume = volume;
        self.status.volume = volume;
        self.persist();
        self.publish();
        self.emit(ConsoleEvent::TransportChanged(self.status));

        if self.binding.bound().is_none() {
            return Ok(());
        }
        self.transport
            .set_volume(volume)
            .await
            .map_err(|e| self.fail(e))
    }

    pub async fn enter_fullscreen(&mut self) -> ConsoleResult<()> {
        if self.binding.bound().is_none() || self.is_fullscreen {
            return Ok(());
        }
        self.transport
            .enter_fullscreen()
            .await
            .map_err(|e| self.fail(e))?;
        self.is_fullscreen = true;
        self.publish();
        Ok(())
    }

    pub async fn exit_fullscreen(&mut self) -> ConsoleResult<()> {
        if !self.is_fullscreen {
            return Ok(());
        }
        self.transport
            .exit_fullscreen()
            .await
            .map_err(|e| self.fail(e))?;
        self.is_fullscreen = false;
        self.publish();
        Ok(())
    }

    pub async fn toggle_fullscreen(&mut self) -> ConsoleResult<()> {
        if self.is_fullscreen {
            self.exit_fullscreen().await
        } else {
            self.enter_fullscreen().await
        }
    }

    /// Swap the transport over to `source`
    ///
    /// The previous source is released (and the release confirmed) before the
    /// new one is bound, so the transport never holds two sources.
    async fn rebind(&mut self, source: Option<SourceDescriptor>, autoplay: bool) {
        if self.binding != BindPhase::Unbound {
            self.binding = BindPhase::AwaitingRelease;
            self.publish();

            if let Err(e) = self.transport.unbind().await {
                tracing::warn!("Transport unbind failed: {}", e);
            }
            let settle = self.config.settle_delay();
            if !settle.is_zero() {
                tokio::time::sleep(settle).await;
            }
            self.binding = BindPhase::Unbound;
        }

        let Some(source) = source else {
            self.publish();
            return;
        };

        let result = self.transport.bind(&source).await;
        tracing::debug!("Bound {:?}", source.summary());
        self.binding = BindPhase::Bound(source);
        self.binding_generation = self.binding_generation.wrapping_add(1);
        self.publish();

        match result {
            Ok(()) => {
                if let Err(e) = self.transport.set_volume(self.intent.volume).await {
                    tracing::warn!("Failed to apply volume: {}", e);
                }
                if autoplay {
                    if let Err(e) = self.transport.play().await {
                        self.playback_failed(e);
                    }
                }
            }
            Err(e) => {
                self.playback_failed(e);
            }
        }
        self.publish();
    }

    fn playback_failed(&mut self, error: TransportError) -> ConsoleError {
        self.status.is_playing = false;
        self.publish();
        self.emit(ConsoleEvent::TransportChanged(self.status));
        self.fail(error)
    }

    // =========================================================================
    // Library
    // =========================================================================

    /// Flip an item's completion flag. Returns the new value, or None if the
    /// id is unknown.
    pub fn toggle_item_completion(&mut self, item_id: u32) -> Option<bool> {
        let completed = self.library.toggle_completion(item_id)?;

        if let Some(ActiveSource::Library(item)) = &mut self.active {
            if item.id == item_id {
                item.completed = completed;
            }
        }

        self.library_changed();
        Some(completed)
    }

    pub fn add_video(&mut self, video: NewVideo) -> LibraryItem {
        let item = self.library.add(video).clone();
        tracing::info!("Added '{}' as item {}", item.title, item.id);
        self.library_changed();
        item
    }

    pub fn add_to_playlist(&mut self, entry: PlaylistEntry) {
        self.playlist.push(entry);
        self.library_changed();
    }

    pub fn add_comment(&mut self, item_id: u32, text: impl Into<String>) -> ConsoleResult<()> {
        self.ensure_item(item_id)?;
        self.comments.entry(item_id).or_default().push(Comment {
            text: text.into(),
            created_at: Utc::now(),
        });
        self.library_changed();
        Ok(())
    }

    /// Record a 1 to 5 rating; out-of-range scores are clamped
    pub fn add_rating(&mut self, item_id: u32, score: u8) -> ConsoleResult<()> {
        self.ensure_item(item_id)?;
        self.ratings.entry(item_id).or_default().push(Rating {
            score: score.clamp(1, 5),
            created_at: Utc::now(),
        });
        self.library_changed();
        Ok(())
    }

    pub fn comments(&self, item_id: u32) -> &[Comment] {
        self.comments.get(&item_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn average_rating(&self, item_id: u32) -> Option<f64> {
        let ratings = self.ratings.get(&item_id).filter(|r| !r.is_empty())?;
        let total: u32 = ratings.iter().map(|r| u32::from(r.score)).sum();
        Some(f64::from(total) / ratings.len() as f64)
    }

    fn ensure_item(&self, item_id: u32) -> ConsoleResult<()> {
        match self.library.get(item_id) {
            Some(_) => Ok(()),
            None => Err(ConsoleError::UnknownItem(item_id)),
        }
    }

    fn library_changed(&mut self) {
        self.persist();
        self.publish();
        self.emit(ConsoleEvent::LibraryChanged);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> SourceState {
        SourceState::of(self.active.as_ref(), &self.session)
    }

    pub fn active_source(&self) -> Option<&ActiveSource> {
        self.active.as_ref()
    }

    pub fn status(&self) -> TransportStatus {
        self.status
    }

    pub fn intent(&self) -> TransportIntent {
        self.intent
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn playlist(&self) -> &[PlaylistEntry] {
        &self.playlist
    }

    pub fn bound_source(&self) -> Option<&SourceDescriptor> {
        self.binding.bound()
    }

    pub fn binding_generation(&self) -> u64 {
        self.binding_generation
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        self.snapshot.read().clone()
    }

    /// Shared snapshot cell, refreshed before every await point
    pub fn shared_snapshot(&self) -> Arc<RwLock<ConsoleSnapshot>> {
        self.snapshot.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<ConsoleEvent> {
        self.event_tx.clone()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn last_selected_item(&self) -> Option<LibraryItem> {
        self.last_selected
            .and_then(|id| self.library.get(id))
            .cloned()
    }

    fn remember_selection(&mut self, item_id: u32) {
        self.last_selected = Some(item_id);
        if let Err(e) = store::save_last_selected(self.store.as_ref(), item_id) {
            tracing::warn!("{}", ConsoleError::from(e));
        }
    }

    fn persist(&self) {
        let state = PersistedState {
            videos: self.library.clone(),
            playlist: self.playlist.clone(),
            current_video: self.active.clone(),
            volume: self.intent.volume,
            comments: self.comments.clone(),
            ratings: self.ratings.clone(),
        };
        if let Err(e) = store::save_state(self.store.as_ref(), &state) {
            tracing::warn!("{}", ConsoleError::from(e));
        }
    }

    fn publish(&self) {
        let snapshot = ConsoleSnapshot {
            state: self.state(),
            active_source: self.active.clone(),
            status: self.status,
            position_label: format_time(self.status.position_seconds),
            duration_label: format_time(self.status.duration_seconds),
            intent: self.intent,
            capture: self.session.flags(),
            bound: self.binding.bound().map(SourceDescriptor::summary),
            bind_phase: self.binding.kind(),
            binding_generation: self.binding_generation,
            is_fullscreen: self.is_fullscreen,
            videos: self.library.items().to_vec(),
            playlist: self.playlist.clone(),
            progress_percent: self.library.progress_percent(),
            total_duration: self.library.total_duration_label(),
        };
        *self.snapshot.write() = snapshot;
    }

    fn emit(&self, event: ConsoleEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Log and broadcast a non-fatal error, handing it back to the caller
    fn fail(&self, error: impl Into<ConsoleError>) -> ConsoleError {
        let error = error.into();
        tracing::warn!("{}", error);
        self.emit(ConsoleEvent::Notice(ErrorResponse::from(&error)));
        error
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if let Some(stream) = self.session.take_stream() {
            let stopped = stream.stop_all_tracks();
            tracing::warn!(
                "Console dropped with the camera on; stopped {} tracks of stream {} without closing the device",
                stopped,
                stream.id()
            );
        }
    }
}

fn url_source(item: &LibraryItem) -> SourceDescriptor {
    SourceDescriptor::Url {
        url: item.source_url.clone(),
        poster: Some(item.thumbnail_url.clone()).filter(|p| !p.is_empty()),
    }
}
