//! Viewer settings: snapshot source, polling interval and history depth

use alloc::string::String;
use core::num::NonZeroUsize;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

/// Endpoint of the device firmware that serves frame buffer snapshots.
pub const DEFAULT_SOURCE: &str = "http://opendtu.local/api/display/getbuffer";

/// Default polling interval in milliseconds.
pub const DEFAULT_REFRESH_MS: i64 = 1000;

/// Settings supplied by whoever embeds the viewer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Where snapshots are fetched from (URL or file path, per source)
    pub source: String,
    /// Polling interval; zero or negative freezes the display
    pub refresh_ms: i64,
    /// Frames kept for the heat map; 1 draws plain on/off pixels
    pub history_depth: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            source: String::from(DEFAULT_SOURCE),
            refresh_ms: DEFAULT_REFRESH_MS,
            history_depth: 1,
        }
    }
}

impl ViewerConfig {
    pub fn refresh_rate(&self) -> RefreshRate {
        RefreshRate::from_millis(self.refresh_ms)
    }

    /// History depth, raised to 1 if configured as 0.
    pub fn history_depth(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.history_depth).unwrap_or(NonZeroUsize::MIN)
    }
}

/// How often the controller polls for a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRate {
    /// No polling; the last frame stays on screen
    Frozen,
    /// Poll once per interval
    Every(Duration),
}

impl RefreshRate {
    /// Interpret a millisecond rate; `ms <= 0` freezes the display.
    pub fn from_millis(ms: i64) -> Self {
        if ms <= 0 {
            Self::Frozen
        } else {
            Self::Every(Duration::from_millis(ms as u64))
        }
    }

    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::Frozen => None,
            Self::Every(interval) => Some(interval),
        }
    }
}
