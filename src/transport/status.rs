//! Transport status model
//!
//! [`TransportStatus`] is what the surface has confirmed; [`TransportIntent`]
//! is what the user last asked for.

use super::adapter::TransportEvent;
use serde::{Deserialize, Serialize};

/// Confirmed transport state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStatus {
    pub is_playing: bool,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f64,
}

impl Default for TransportStatus {
    fn default() -> Self {
        Self {
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume: 1.0,
        }
    }
}

impl TransportStatus {
    /// Fold a transport event into the status. Returns whether anything changed.
    pub fn apply(&mut self, event: &TransportEvent) -> bool {
        let before = *self;
        match *event {
            TransportEvent::Started => self.is_playing = true,
            TransportEvent::Stopped | TransportEvent::Ended => self.is_playing = false,
            TransportEvent::VolumeChanged(v) => self.volume = clamp_volume(v),
            TransportEvent::PositionChanged(t) if t.is_finite() => {
                self.position_seconds = t.max(0.0)
            }
            TransportEvent::DurationKnown(d) if d.is_finite() => {
                self.duration_seconds = d.max(0.0)
            }
            TransportEvent::PositionChanged(_) | TransportEvent::DurationKnown(_) => {}
        }
        *self != before
    }

    /// Forget timing of the previous source
    pub fn reset_timing(&mut self) {
        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;
    }

    /// Clamp a seek target to the known duration
    ///
    /// While the duration is still unknown only the lower bound applies.
    pub fn clamp_seek(&self, seconds: f64) -> f64 {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if self.duration_seconds > 0.0 {
            seconds.min(self.duration_seconds)
        } else {
            seconds
        }
    }
}

/// What the user requested, pending confirmation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportIntent {
    pub playing: bool,
    pub volume: f64,
}

impl Default for TransportIntent {
    fn default() -> Self {
        Self {
            playing: false,
            volume: 1.0,
        }
    }
}

pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}
