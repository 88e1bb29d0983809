//! Background art loading on a helper thread.
//!
//! Each request spawns a short-lived thread that decodes one PNG and sends
//! the result back over a channel. The main loop drains the channel through
//! [`AssetLoader::poll_finished`]; the helper never touches the controller.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use embedded_graphics::pixelcolor::Rgb888;
use log::{debug, error};
use webdisplay_core::{AssetError, AssetLoader, AssetRequest, AssetTicket, BackgroundArt};

type Completion = (AssetTicket, Result<BackgroundArt, AssetError>);

/// Loads `<dir>/<art>` PNG files.
pub struct PngArtLoader {
    dir: PathBuf,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl PngArtLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            dir: dir.into(),
            tx,
            rx,
        }
    }
}

impl AssetLoader for PngArtLoader {
    fn start(&mut self, request: AssetRequest) {
        let path = self.dir.join(request.art);
        let tx = self.tx.clone();
        debug!("Loading {}", path.display());

        let spawned = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let result = load_png(&path);
                // the receiver only goes away when the simulator exits
                let _ = tx.send((request.ticket, result));
            });
        if let Err(e) = spawned {
            error!("Could not start asset loader thread: {}", e);
            let _ = self
                .tx
                .send((request.ticket, Err(AssetError::Decode(e.to_string()))));
        }
    }

    fn poll_finished(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}

/// Decode a PNG file into opaque RGB pixels.
pub fn load_png(path: &Path) -> Result<BackgroundArt, AssetError> {
    let file =
        File::open(path).map_err(|_| AssetError::NotFound(path.display().to_string()))?;

    let mut decoder = png::Decoder::new(file);
    // palettes and low bit depths become 8-bit gray or RGB, 16-bit is cut to 8
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| AssetError::Decode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| AssetError::Decode(e.to_string()))?;

    let pixels = to_rgb(&buf[..info.buffer_size()], info.color_type)?;
    BackgroundArt::new(info.width, info.height, pixels)
}

/// Convert decoded 8-bit samples to colors, blending alpha over white.
fn to_rgb(samples: &[u8], color_type: png::ColorType) -> Result<Vec<Rgb888>, AssetError> {
    let pixels = match color_type {
        png::ColorType::Rgb => samples
            .chunks_exact(3)
            .map(|p| Rgb888::new(p[0], p[1], p[2]))
            .collect(),
        png::ColorType::Rgba => samples
            .chunks_exact(4)
            .map(|p| Rgb888::new(over_white(p[0], p[3]), over_white(p[1], p[3]), over_white(p[2], p[3])))
            .collect(),
        png::ColorType::Grayscale => samples.iter().map(|&v| Rgb888::new(v, v, v)).collect(),
        png::ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .map(|p| {
                let v = over_white(p[0], p[1]);
                Rgb888::new(v, v, v)
            })
            .collect(),
        png::ColorType::Indexed => return Err(AssetError::Unsupported),
    };
    Ok(pixels)
}

fn over_white(value: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(value) * a + 255 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use webdisplay_core::{AssetState, DeviceChange, PollingController, ProfileRegistry, ViewerConfig};
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::SimulatorDisplay;

    fn write_png(path: &Path, width: u32, height: u32, color: png::ColorType, data: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = png::Encoder::new(file, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("webdisplay-assets-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_rgb_png() {
        let dir = temp_dir("rgb");
        let path = dir.join("panel.png");
        write_png(&path, 2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);

        let art = load_png(&path).unwrap();
        assert_eq!(art.size(), Size::new(2, 1));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_alpha_blends_over_white() {
        let pixels = to_rgb(&[0, 0, 0, 0, 0, 0, 0, 255], png::ColorType::Rgba).unwrap();
        assert_eq!(pixels, vec![Rgb888::WHITE, Rgb888::BLACK]);

        let gray = to_rgb(&[10, 20], png::ColorType::Grayscale).unwrap();
        assert_eq!(gray[1], Rgb888::new(20, 20, 20));
    }

    #[test]
    fn test_missing_file() {
        let result = load_png(Path::new("/nonexistent/PCD8544.png"));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_loader_completes_device_change() {
        let dir = temp_dir("loader");
        write_png(&dir.join("PCD8544.png"), 1, 1, png::ColorType::Rgb, &[1, 2, 3]);

        let display = SimulatorDisplay::<Rgb888>::new(Size::new(64, 64));
        let mut controller =
            PollingController::new(display, ProfileRegistry::builtin(), &ViewerConfig::default());
        let mut loader = PngArtLoader::new(&dir);

        assert!(matches!(controller.request_device_type(1), DeviceChange::LoadStarted(_)));
        loader.start(controller.take_asset_request().unwrap());

        let deadline = Instant::now() + Duration::from_secs(5);
        let (ticket, result) = loop {
            if let Some(done) = loader.poll_finished() {
                break done;
            }
            assert!(Instant::now() < deadline, "asset load timed out");
            thread::sleep(Duration::from_millis(5));
        };
        controller.complete_asset_load(ticket, result);

        assert_eq!(controller.device_type().map(|d| d.code()), Some(1));
        assert_eq!(controller.asset_state(), AssetState::Idle);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
