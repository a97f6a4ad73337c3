//! Live capture
//!
//! Camera/microphone stream handles, recording format negotiation, the
//! chunked recorder and artifact delivery.

pub mod artifact;
pub mod format;
pub mod manager;
pub mod recorder;
pub mod traits;

pub use artifact::{ArtifactSink, DirectorySink};
pub use format::{negotiate_format, Container, RecordingFormat};
pub use manager::CaptureDeviceManager;
pub use recorder::{
    EncoderSession, MediaEncoder, RecordedChunk, RecorderCallbacks, RecorderHandle,
    RecorderState, RecordingArtifact,
};
pub use traits::{
    CaptureBackend, CaptureError, CaptureResult, MediaStream, MediaTrack, StreamConstraints,
    TrackKind,
};
