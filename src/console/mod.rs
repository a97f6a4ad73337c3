//! Playback console
//!
//! The coordinator that owns which source is on screen, the shared handle
//! callers drive it through, and the snapshot and events it publishes.

pub mod coordinator;
pub mod events;
pub mod handle;
pub mod state;

pub use coordinator::{ConsoleDeps, Coordinator};
pub use events::ConsoleEvent;
pub use handle::ConsoleHandle;
pub use state::{BindPhase, BindPhaseKind, CaptureFlags, CaptureSession, ConsoleSnapshot, SourceState};
