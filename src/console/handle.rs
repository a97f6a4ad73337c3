//! Shared console handle
//!
//! Serializes every operation through one async mutex so concurrent callers
//! are applied in arrival order and never interleave a source swap. Snapshot
//! reads and event subscriptions do not take the lock.

use super::coordinator::{ConsoleDeps, Coordinator};
use super::events::ConsoleEvent;
use super::state::ConsoleSnapshot;
use crate::config::ConsoleConfig;
use crate::library::{Comment, LibraryItem, NewVideo, PlaylistEntry};
use crate::transport::TransportEvent;
use crate::utils::error::ConsoleResult;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct ConsoleHandle {
    coordinator: Arc<Mutex<Coordinator>>,
    snapshot: Arc<RwLock<ConsoleSnapshot>>,
    event_tx: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleHandle {
    pub fn new(deps: ConsoleDeps, config: ConsoleConfig) -> Self {
        Self::from_coordinator(Coordinator::new(deps, config))
    }

    pub fn from_coordinator(coordinator: Coordinator) -> Self {
        Self {
            snapshot: coordinator.shared_snapshot(),
            event_tx: coordinator.event_sender(),
            coordinator: Arc::new(Mutex::new(coordinator)),
        }
    }

    /// Latest published state. Never waits on an in-flight operation.
    pub fn snapshot(&self) -> ConsoleSnapshot {
        self.snapshot.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.event_tx.subscribe()
    }

    pub async fn start(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.start().await
    }

    pub async fn select_item(&self, item_id: u32, autoplay: bool) -> ConsoleResult<()> {
        self.coordinator
            .lock()
            .await
            .select_item(item_id, autoplay)
            .await
    }

    pub async fn play_next(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.play_next().await
    }

    pub async fn toggle_capture(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.toggle_capture().await
    }

    pub async fn start_recording(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.start_recording().await
    }

    pub async fn stop_recording(&self) -> ConsoleResult<Option<PathBuf>> {
        self.coordinator.lock().await.stop_recording().await
    }

    pub async fn toggle_item_completion(&self, item_id: u32) -> Option<bool> {
        self.coordinator
            .lock()
            .await
            .toggle_item_completion(item_id)
    }

    pub async fn play(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.play().await
    }

    pub async fn pause(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.pause().await
    }

    pub async fn seek(&self, seconds: f64) -> ConsoleResult<()> {
        self.coordinator.lock().await.seek(seconds).await
    }

    pub async fn skip(&self, delta_seconds: f64) -> ConsoleResult<()> {
        self.coordinator.lock().await.skip(delta_seconds).await
    }

    pub async fn skip_forward(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.skip_forward().await
    }

    pub async fn skip_backward(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.skip_backward().await
    }

    pub async fn set_volume(&self, volume: f64) -> ConsoleResult<()> {
        self.coordinator.lock().await.set_volume(volume).await
    }

    pub async fn enter_fullscreen(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.enter_fullscreen().await
    }

    pub async fn toggle_fullscreen(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.toggle_fullscreen().await
    }

    pub async fn exit_fullscreen(&self) -> ConsoleResult<()> {
        self.coordinator.lock().await.exit_fullscreen().await
    }

    pub async fn add_video(&self, video: NewVideo) -> LibraryItem {
        self.coordinator.lock().await.add_video(video)
    }

    pub async fn add_to_playlist(&self, entry: PlaylistEntry) {
        self.coordinator.lock().await.add_to_playlist(entry)
    }

    pub async fn add_comment(&self, item_id: u32, text: String) -> ConsoleResult<()> {
        self.coordinator.lock().await.add_comment(item_id, text)
    }

    pub async fn add_rating(&self, item_id: u32, score: u8) -> ConsoleResult<()> {
        self.coordinator.lock().await.add_rating(item_id, score)
    }

    pub async fn comments(&self, item_id: u32) -> Vec<Comment> {
        self.coordinator.lock().await.comments(item_id).to_vec()
    }

    pub async fn average_rating(&self, item_id: u32) -> Option<f64> {
        self.coordinator.lock().await.average_rating(item_id)
    }

    /// Feed one transport notification into the console
    ///
    /// The notification is stamped with the binding current on arrival, so
    /// one that queues behind a source swap is dropped.
    pub async fn dispatch(&self, event: TransportEvent) {
        let generation = self.snapshot.read().binding_generation;
        self.coordinator
            .lock()
            .await
            .handle_transport_event_for(generation, event)
            .await
    }

    /// Finalize recording, close the camera and unbind the transport
    pub async fn shutdown(&self) {
        self.coordinator.lock().await.shutdown().await
    }

    /// Forward transport notifications until the sender side closes
    pub fn spawn_event_pump(&self, mut events: mpsc::Receiver<TransportEvent>) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                handle.dispatch(event).await;
            }
            tracing::debug!("Transport event channel closed");
        })
    }
}
