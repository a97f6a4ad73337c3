//! Notifications emitted by the console

use super::state::CaptureFlags;
use crate::library::ActiveSource;
use crate::transport::TransportStatus;
use crate::utils::error::ErrorResponse;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// The on-screen source changed
    SourceChanged(Option<ActiveSource>),
    /// Confirmed transport status changed
    TransportChanged(TransportStatus),
    /// Camera session or recording flags changed
    CaptureChanged(CaptureFlags),
    /// Library, playlist, comments or ratings changed
    LibraryChanged,
    /// The recorder flushed a chunk
    ChunkRecorded { index: usize, bytes: usize },
    /// A recording was finalized and delivered
    RecordingSaved { path: PathBuf, bytes: usize },
    /// Non-fatal error to show the user
    Notice(ErrorResponse),
}
