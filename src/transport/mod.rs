//! Playback transport
//!
//! Contract for the external rendering surface and the status model its
//! events feed.

pub mod adapter;
pub mod status;

pub use adapter::{
    BoundSource, SourceDescriptor, TransportAdapter, TransportError, TransportEvent,
    TransportResult,
};
pub use status::{clamp_volume, TransportIntent, TransportStatus};
