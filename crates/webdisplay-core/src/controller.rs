//! Polling controller
//!
//! Owns the rendering surface and everything drawn on it, and decides what
//! happens to each snapshot the device publishes:
//!
//! 1. The snapshot's display type is requested as the active device. A new
//!    panel type with background art starts an asset load; while that load is
//!    in flight every snapshot and every further type change is dropped.
//! 2. Invalid display types are dropped.
//! 3. The buffer is decoded, appended to the frame history and drawn, either
//!    as on/off pixels or, with a history deeper than one frame, as a heat map.
//!
//! The controller never blocks. Fetching and asset loading are delegated to a
//! [`SnapshotSource`] and an [`AssetLoader`]; their results are fed back in
//! through [`PollingController::tick`] (or the individual transition methods)
//! on the thread that owns the controller.

use alloc::string::String;
use core::fmt::Debug;
use core::num::NonZeroUsize;

use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, error, info, warn};

use crate::config::{RefreshRate, ViewerConfig};
use crate::decoder::decode;
use crate::error::{AssetError, SnapshotError, TransportError};
use crate::history::FrameHistory;
use crate::profile::{DeviceType, ProfileRegistry};
use crate::render::{BackgroundArt, Frame, PanelArea, RenderMode, draw_background_art, render};
use crate::snapshot::{Snapshot, TileLayout};

/// Supplies snapshots from the device.
pub trait SnapshotSource {
    /// Fetch the current snapshot.
    fn fetch(&mut self) -> Result<Snapshot, TransportError>;
}

/// Loads background art outside of the controller.
///
/// Loading may take any number of ticks. Completions are collected by
/// [`PollingController::tick`] through [`AssetLoader::poll_finished`].
pub trait AssetLoader {
    /// Begin loading the art named by `request`.
    fn start(&mut self, request: AssetRequest);

    /// Return one finished load, if any.
    fn poll_finished(&mut self) -> Option<(AssetTicket, Result<BackgroundArt, AssetError>)>;
}

/// Identifies one asset load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTicket {
    device: DeviceType,
    serial: u32,
}

impl AssetTicket {
    /// Device that becomes active once the load succeeds.
    pub fn device(&self) -> DeviceType {
        self.device
    }
}

/// Art to load for a pending device change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub ticket: AssetTicket,
    /// Art reference from the device's profile
    pub art: &'static str,
}

/// Single-flight guard over background art loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetState {
    #[default]
    Idle,
    Loading(AssetTicket),
}

/// Result of requesting a device type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceChange {
    /// The type is already active
    Unchanged,
    /// The request was dropped; the active device is untouched
    Rejected(SnapshotError),
    /// The profile has no art; the type is active immediately
    Switched(DeviceType),
    /// Art is loading; the type becomes active when it completes
    LoadStarted(AssetTicket),
}

/// A snapshot that made it onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOutcome {
    pub device: DeviceType,
    pub mode: RenderMode,
    /// Frames in the history after this one was added
    pub history_len: usize,
}

/// Drives a rendering surface from periodic device snapshots.
pub struct PollingController<D>
where
    D: DrawTarget,
{
    surface: D,
    registry: ProfileRegistry,
    history: FrameHistory,
    device: Option<DeviceType>,
    asset: AssetState,
    pending_request: Option<AssetRequest>,
    next_serial: u32,
    layout: Option<TileLayout>,
    source: String,
    refresh: RefreshRate,
    next_tick: Option<Instant>,
}

impl<D, C> PollingController<D>
where
    D: DrawTarget<Color = C>,
    D::Error: Debug,
    C: PixelColor + From<Rgb888>,
{
    /// Create a controller that owns `surface`.
    ///
    /// Polling starts with the first call to [`Self::poll_due`], which
    /// schedules the first fetch one interval later.
    pub fn new(surface: D, registry: ProfileRegistry, config: &ViewerConfig) -> Self {
        info!(
            "Viewer for {} (refresh {:?}, history {})",
            config.source,
            config.refresh_rate(),
            config.history_depth()
        );
        Self {
            surface,
            registry,
            history: FrameHistory::new(config.history_depth()),
            device: None,
            asset: AssetState::Idle,
            pending_request: None,
            next_serial: 0,
            layout: None,
            source: config.source.clone(),
            refresh: config.refresh_rate(),
            next_tick: None,
        }
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Locator the snapshots come from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Currently drawn device type, `None` until the first one is accepted.
    pub fn device_type(&self) -> Option<DeviceType> {
        self.device
    }

    pub fn asset_state(&self) -> AssetState {
        self.asset
    }

    pub fn refresh_rate(&self) -> RefreshRate {
        self.refresh
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Change the polling interval.
    ///
    /// Setting the current rate again keeps the pending schedule. Otherwise
    /// the pending tick is cancelled and, unless frozen, the next one is due
    /// one interval after `now`.
    pub fn set_refresh_rate(&mut self, rate: RefreshRate, now: Instant) {
        if rate == self.refresh {
            return;
        }
        info!("Refresh rate {:?} -> {:?}", self.refresh, rate);
        self.refresh = rate;
        self.next_tick = rate.interval().map(|interval| now + interval);
    }

    /// Whether a fetch is due at `now`.
    ///
    /// Returns true at most once per elapsed interval; ticks missed while the
    /// caller was busy are not replayed.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        let Some(interval) = self.refresh.interval() else {
            return false;
        };
        match self.next_tick {
            None => {
                self.next_tick = Some(now + interval);
                false
            }
            Some(due) if now >= due => {
                let next = due + interval;
                self.next_tick = Some(if next > now { next } else { now + interval });
                true
            }
            Some(_) => false,
        }
    }

    /// Change the number of frames aggregated into the heat map.
    pub fn set_history_depth(&mut self, depth: NonZeroUsize) {
        if depth != self.history.max_len() {
            info!("History depth {} -> {}", self.history.max_len(), depth);
            self.history.set_max_len(depth);
        }
    }

    // -----------------------------------------------------------------------
    // Device type and asset guard
    // -----------------------------------------------------------------------

    /// Request `code` as the active device type.
    ///
    /// While an asset load is in flight the first request wins and every
    /// later one is dropped. Any accepted change clears the frame history.
    pub fn request_device_type(&mut self, code: i64) -> DeviceChange {
        if self.device.is_some_and(|current| i64::from(current.code()) == code) {
            return DeviceChange::Unchanged;
        }
        if let AssetState::Loading(ticket) = self.asset {
            debug!(
                "Ignoring device type {} while art for {} loads",
                code,
                ticket.device.code()
            );
            return DeviceChange::Rejected(SnapshotError::AssetLoadInFlight);
        }

        let (device, profile) = match self.registry.profile_for(code) {
            Ok(found) => found,
            Err(e) => {
                debug!("Rejecting device type: {}", e);
                return DeviceChange::Rejected(SnapshotError::InvalidDeviceType(code));
            }
        };

        self.history.clear();
        match profile.art {
            None => {
                info!("Device type {} ({})", code, profile.name);
                self.device = Some(device);
                DeviceChange::Switched(device)
            }
            Some(art) => {
                let ticket = AssetTicket {
                    device,
                    serial: self.next_serial,
                };
                self.next_serial = self.next_serial.wrapping_add(1);
                info!("Device type {} ({}), loading {}", code, profile.name, art);
                self.asset = AssetState::Loading(ticket);
                self.pending_request = Some(AssetRequest { ticket, art });
                DeviceChange::LoadStarted(ticket)
            }
        }
    }

    /// Hand the asset request of the last device change to a loader.
    pub fn take_asset_request(&mut self) -> Option<AssetRequest> {
        self.pending_request.take()
    }

    /// Finish the in-flight asset load.
    ///
    /// On success the art is painted and the requested device becomes
    /// active. On failure the previous device and background stay in place.
    /// Completions that do not match the in-flight ticket are ignored.
    pub fn complete_asset_load(
        &mut self,
        ticket: AssetTicket,
        result: Result<BackgroundArt, AssetError>,
    ) {
        if self.asset != AssetState::Loading(ticket) {
            warn!("Ignoring stale asset load {:?}", ticket);
            return;
        }
        self.asset = AssetState::Idle;
        self.pending_request = None;

        match result {
            Ok(art) => {
                if let Err(e) = draw_background_art(&mut self.surface, &art) {
                    error!("Background art draw error: {:?}", e);
                }
                self.device = Some(ticket.device);
                info!("Device type {} active", ticket.device.code());
            }
            Err(e) => {
                warn!(
                    "Background art for device type {} failed: {}",
                    ticket.device.code(),
                    e
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Decode, record and draw one snapshot.
    ///
    /// Dropped snapshots leave the surface showing the last good frame.
    pub fn handle_snapshot(
        &mut self,
        snapshot: &Snapshot,
    ) -> Result<SnapshotOutcome, SnapshotError> {
        self.request_device_type(snapshot.display_type);

        if matches!(self.asset, AssetState::Loading(_)) {
            return Err(SnapshotError::AssetLoadInFlight);
        }
        let device = match self.device {
            Some(device) if i64::from(device.code()) == snapshot.display_type => device,
            _ => return Err(SnapshotError::InvalidDeviceType(snapshot.display_type)),
        };

        let layout = snapshot.layout();
        let grid = decode(&snapshot.buffer_content, &layout)?;
        self.layout = Some(layout);
        self.history.push(grid);

        let mode = self.redraw()?.unwrap_or(RenderMode::Binary);
        Ok(SnapshotOutcome {
            device,
            mode,
            history_len: self.history.len(),
        })
    }

    /// Draw the current history again, e.g. after changing its depth.
    ///
    /// Returns the mode used, or `None` if there is nothing to draw yet.
    pub fn redraw(&mut self) -> Result<Option<RenderMode>, SnapshotError> {
        let (Some(device), Some(layout)) = (self.device, self.layout) else {
            return Ok(None);
        };
        let profile = self.registry.get(device);
        let area = PanelArea::new(layout.display_rows, layout.display_columns);

        let result = if self.history.uses_heat() {
            let Some(heat) = self.history.heat_grid() else {
                return Ok(None);
            };
            render(&mut self.surface, profile, Frame::Heat(&heat), area).map(|_| RenderMode::Heat)
        } else {
            let Some(latest) = self.history.latest() else {
                return Ok(None);
            };
            render(&mut self.surface, profile, Frame::Binary(latest), area)
                .map(|_| RenderMode::Binary)
        };

        match result {
            Ok(mode) => Ok(Some(mode)),
            Err(e) => {
                error!("Display render error: {:?}", e);
                Err(SnapshotError::Surface)
            }
        }
    }

    /// Run one iteration of the polling loop.
    ///
    /// Collects finished asset loads, fetches and draws a snapshot if one is
    /// due, and starts any asset load requested along the way. Failures are
    /// logged and swallowed; the next due tick simply tries again.
    pub fn tick<S, L>(&mut self, now: Instant, source: &mut S, loader: &mut L) -> Option<SnapshotOutcome>
    where
        S: SnapshotSource + ?Sized,
        L: AssetLoader + ?Sized,
    {
        while let Some((ticket, result)) = loader.poll_finished() {
            self.complete_asset_load(ticket, result);
        }

        let mut outcome = None;
        if self.poll_due(now) {
            match source.fetch() {
                Ok(snapshot) => match self.handle_snapshot(&snapshot) {
                    Ok(drawn) => {
                        debug!("Drew {:?} frame ({} in history)", drawn.mode, drawn.history_len);
                        outcome = Some(drawn);
                    }
                    Err(SnapshotError::MalformedBuffer(e)) => {
                        warn!("Dropping snapshot: malformed buffer: {}", e)
                    }
                    Err(e) => debug!("Dropping snapshot: {}", e),
                },
                Err(e) => warn!("Snapshot fetch from {} failed: {}", self.source, e),
            }
        }

        if let Some(request) = self.take_asset_request() {
            loader.start(request);
        }
        outcome
    }
}
