//! Hardware-independent core library for webdisplay
//!
//! webdisplay mirrors the monochrome panel of a remote device. The device
//! periodically publishes a JSON snapshot of its raw frame buffer; this crate
//! turns those snapshots into pixels on any `embedded-graphics` draw target:
//!
//! - [`profile`]: geometry and color profiles per supported panel type.
//! - [`decoder`]: hex, bit-packed, tiled frame buffers to [`grid::PixelGrid`]s.
//! - [`history`] and [`heatmap`]: a bounded window of recent frames and its
//!   per-pixel activity reduction.
//! - [`render`]: paints a frame (or heat map) and background art onto a surface.
//! - [`controller`]: refresh cadence, asset-load guard and snapshot dispatch.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on embedded
//! targets as well as desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod grid;
pub mod heatmap;
pub mod history;
pub mod profile;
pub mod render;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{RefreshRate, ViewerConfig};
pub use controller::{
    AssetLoader, AssetRequest, AssetState, AssetTicket, DeviceChange, PollingController,
    SnapshotOutcome, SnapshotSource,
};
pub use decoder::decode;
pub use error::{AssetError, DecodeError, ProfileError, SnapshotError, TransportError};
pub use grid::PixelGrid;
pub use heatmap::{HeatColor, HeatGrid};
pub use history::FrameHistory;
pub use profile::{DeviceType, DisplayProfile, ProfileRegistry};
pub use render::{BackgroundArt, Frame, PanelArea, RenderMode};
pub use snapshot::{Snapshot, TileLayout};
