//! Desktop mirror for the monochrome panel of a remote device.
//!
//! Polls the device's frame buffer endpoint (or replays a recording) and
//! renders the panel in an SDL2 window via `embedded-graphics-simulator`.
//!
//! # Key bindings
//!
//! | Key     | Action                                   |
//! |---------|------------------------------------------|
//! | H       | Toggle heat map (history 1 ↔ 8 frames)   |
//! | +       | Poll twice as often                      |
//! | -       | Poll half as often                       |
//! | Space   | Freeze / resume polling                  |
//! | Q / Esc | Quit                                     |

mod assets;
mod cli;
mod source;

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use webdisplay_core::{PollingController, ProfileRegistry, RefreshRate, SnapshotSource};

use crate::assets::PngArtLoader;
use crate::cli::Options;
use crate::source::{HttpSource, ReplaySource};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Surface size that holds every built-in panel at zoom 1.
const SURFACE_WIDTH: f32 = 1400.0;
const SURFACE_HEIGHT: f32 = 1280.0;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// History depth used when heat mode is switched on from the keyboard.
const HEAT_HISTORY: NonZeroUsize = NonZeroUsize::new(8).unwrap();

/// Refresh interval bounds for the `+` / `-` keys.
const MIN_REFRESH_MS: i64 = 100;
const MAX_REFRESH_MS: i64 = 60_000;

// ---------------------------------------------------------------------------
// Keyboard state
// ---------------------------------------------------------------------------

/// Refresh rate the user controls from the keyboard.
///
/// Freezing keeps the interval so resuming restores it.
struct RefreshControl {
    interval_ms: i64,
    frozen: bool,
}

impl RefreshControl {
    fn new(configured_ms: i64) -> Self {
        if configured_ms <= 0 {
            Self {
                interval_ms: webdisplay_core::config::DEFAULT_REFRESH_MS,
                frozen: true,
            }
        } else {
            Self {
                interval_ms: configured_ms,
                frozen: false,
            }
        }
    }

    fn rate(&self) -> RefreshRate {
        if self.frozen {
            RefreshRate::Frozen
        } else {
            RefreshRate::from_millis(self.interval_ms)
        }
    }

    fn faster(&mut self) {
        self.interval_ms = (self.interval_ms / 2).max(MIN_REFRESH_MS);
    }

    fn slower(&mut self) {
        self.interval_ms = (self.interval_ms * 2).min(MAX_REFRESH_MS);
    }

    fn toggle_freeze(&mut self) {
        self.frozen = !self.frozen;
    }
}

/// Controller time from the wall clock.
fn controller_now(start: Instant) -> embassy_time::Instant {
    embassy_time::Instant::from_micros(start.elapsed().as_micros() as u64)
}

fn window_title(options: &Options) -> String {
    format!("webdisplay - {}", options.config.source)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let options = cli::options_from_matches(&cli::command().get_matches());

    let mut snapshot_source: Box<dyn SnapshotSource> = match &options.replay {
        Some(path) => match ReplaySource::open(path) {
            Ok(source) => Box::new(source),
            Err(e) => {
                error!("Cannot replay {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Box::new(HttpSource::new(&options.config.source)),
    };
    run(&options, snapshot_source.as_mut());
}

fn run(options: &Options, snapshot_source: &mut dyn SnapshotSource) {
    let zoom = if options.zoom > 0.0 { options.zoom } else { 1.0 };
    let mut registry = ProfileRegistry::builtin();
    if !options.art {
        registry = registry.without_art();
    } else if !options.assets.is_dir() {
        warn!(
            "Asset directory {} not found, drawing panels without art",
            options.assets.display()
        );
        registry = registry.without_art();
    }
    if zoom != 1.0 {
        registry = registry.scaled(zoom);
    }

    let size = Size::new(
        (SURFACE_WIDTH * zoom) as u32,
        (SURFACE_HEIGHT * zoom) as u32,
    );
    info!("Starting webdisplay simulator");
    info!("Surface: {}×{} (zoom {})", size.width, size.height, zoom);
    info!("Keys: H=Heat map  +/-=Refresh rate  Space=Freeze  Q=Quit");

    // SDL2 display and window
    let mut display = SimulatorDisplay::<Rgb888>::new(size);
    let _ = display.clear(Rgb888::WHITE);
    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    let mut window = Window::new(&window_title(options), &output_settings);

    let mut controller = PollingController::new(display, registry, &options.config);
    let mut loader = PngArtLoader::new(&options.assets);
    let mut refresh = RefreshControl::new(options.config.refresh_ms);
    let configured_depth = options.config.history_depth();

    let start = Instant::now();
    controller.set_refresh_rate(refresh.rate(), controller_now(start));

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(controller.surface());

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();
        let now = controller_now(start);

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::H => {
                        let depth = if controller.history().uses_heat() {
                            NonZeroUsize::MIN
                        } else if configured_depth.get() > 1 {
                            configured_depth
                        } else {
                            HEAT_HISTORY
                        };
                        controller.set_history_depth(depth);
                        if let Err(e) = controller.redraw() {
                            error!("Redraw failed: {}", e);
                        }
                    }
                    Keycode::Plus | Keycode::KpPlus | Keycode::Equals => {
                        refresh.faster();
                        controller.set_refresh_rate(refresh.rate(), now);
                    }
                    Keycode::Minus | Keycode::KpMinus => {
                        refresh.slower();
                        controller.set_refresh_rate(refresh.rate(), now);
                    }
                    Keycode::Space => {
                        refresh.toggle_freeze();
                        controller.set_refresh_rate(refresh.rate(), now);
                    }
                    _ => {}
                },

                _ => {}
            }
        }

        // --- Poll, decode, render ------------------------------------------
        controller.tick(now, snapshot_source, &mut loader);

        window.update(controller.surface());

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
