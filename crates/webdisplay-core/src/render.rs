//! Panel rendering
//!
//! Paints a decoded frame onto any `embedded-graphics` draw target, using a
//! [`DisplayProfile`] to place each logical pixel as a filled dot:
//!
//! ```text
//! offset ─┐
//!         ▼
//!         ██ ██ ██      dot: pixel_size
//!         ██ ██ ██      gap: pixel_space, filled with color_background
//! ```
//!
//! Profile geometry is fractional. Both edges of every rectangle are rounded
//! to the surface grid independently, so neighbouring dots and the gaps
//! between them tile without overlap.
//!
//! Background art is a separate pass that only runs after a successful asset
//! load, never per frame.

use alloc::vec::Vec;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::error::AssetError;
use crate::grid::PixelGrid;
use crate::heatmap::HeatGrid;
use crate::profile::DisplayProfile;

/// What to paint: plain on/off pixels or a heat map.
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    Binary(&'a PixelGrid),
    Heat(&'a HeatGrid),
}

/// Drawing mode selected by a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Binary,
    Heat,
}

impl Frame<'_> {
    pub fn mode(&self) -> RenderMode {
        match self {
            Frame::Binary(_) => RenderMode::Binary,
            Frame::Heat(_) => RenderMode::Heat,
        }
    }

    /// Fill color of the logical pixel at `(row, column)`.
    fn color(&self, profile: &DisplayProfile, row: usize, column: usize) -> Rgb888 {
        match self {
            Frame::Binary(grid) => {
                if grid.get(row, column) {
                    profile.color_pixel_on
                } else {
                    profile.color_pixel_off
                }
            }
            Frame::Heat(heat) => heat
                .get(row, column)
                .map_or(profile.color_pixel_off, |cell| cell.rgb),
        }
    }
}

/// Visible part of the panel, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelArea {
    pub rows: usize,
    pub columns: usize,
}

impl PanelArea {
    pub const fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }
}

/// Round half away from zero; `f32::round` is not available in `core`.
fn round(v: f32) -> i32 {
    if v >= 0.0 {
        (v + 0.5) as i32
    } else {
        (v - 0.5) as i32
    }
}

/// Snap a fractional rectangle to the surface grid.
fn snap(left: f32, top: f32, width: f32, height: f32) -> Rectangle {
    let x0 = round(left);
    let y0 = round(top);
    let x1 = round(left + width);
    let y1 = round(top + height);
    Rectangle::new(
        Point::new(x0, y0),
        Size::new((x1 - x0).max(0) as u32, (y1 - y0).max(0) as u32),
    )
}

/// Paint `frame` onto `surface` using the geometry and palette of `profile`.
///
/// Draws every dot of `area`, then cuts `color_background` through the gaps
/// between dots. The gap passes are skipped for a spacing of 0. Repeating
/// the call with the same arguments yields the same surface.
pub fn render<D, C>(
    surface: &mut D,
    profile: &DisplayProfile,
    frame: Frame<'_>,
    area: PanelArea,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = C>,
    C: PixelColor + From<Rgb888>,
{
    let pitch = profile.pitch();
    let size = profile.pixel_size;
    let space = profile.pixel_space;
    let origin = profile.offset;

    // Dots
    for row in 0..area.rows {
        let top = origin.y + row as f32 * pitch.y;
        for column in 0..area.columns {
            let left = origin.x + column as f32 * pitch.x;
            let dot = snap(left, top, size.x, size.y);
            surface.fill_solid(&dot, C::from(frame.color(profile, row, column)))?;
        }
    }

    if area.rows == 0 || area.columns == 0 {
        return Ok(());
    }

    let background = C::from(profile.color_background);
    let panel_height = area.rows as f32 * pitch.y - space.y;
    let panel_width = area.columns as f32 * pitch.x - space.x;

    // Gaps between columns, top to bottom
    if space.x > 0.0 {
        for column in 0..area.columns - 1 {
            let left = origin.x + column as f32 * pitch.x + size.x;
            let bar = snap(left, origin.y, space.x, panel_height);
            surface.fill_solid(&bar, background)?;
        }
    }

    // Gaps between rows, left to right
    if space.y > 0.0 {
        for row in 0..area.rows - 1 {
            let top = origin.y + row as f32 * pitch.y + size.y;
            let bar = snap(origin.x, top, panel_width, space.y);
            surface.fill_solid(&bar, background)?;
        }
    }

    Ok(())
}

/// Decoded background artwork of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundArt {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl BackgroundArt {
    /// Wrap row-major pixels of a `width x height` image.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb888>) -> Result<Self, AssetError> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
            return Err(AssetError::Decode(alloc::format!(
                "{} pixels for a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            size: Size::new(width, height),
            pixels,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Factor that fits the art inside `bounds` while keeping its aspect ratio.
    pub fn fit_scale(&self, bounds: Size) -> f32 {
        let sx = bounds.width as f32 / self.size.width as f32;
        let sy = bounds.height as f32 / self.size.height as f32;
        sx.min(sy)
    }
}

/// Clear `surface` to white and draw `art` fitted into its top-left corner.
///
/// Scaling is nearest neighbour.
pub fn draw_background_art<D, C>(surface: &mut D, art: &BackgroundArt) -> Result<(), D::Error>
where
    D: DrawTarget<Color = C>,
    C: PixelColor + From<Rgb888>,
{
    let bounds = surface.bounding_box();
    surface.fill_solid(&bounds, C::from(Rgb888::WHITE))?;

    let scale = art.fit_scale(bounds.size);
    let width = (art.size.width as f32 * scale) as u32;
    let height = (art.size.height as f32 * scale) as u32;
    if width == 0 || height == 0 {
        return Ok(());
    }

    let area = Rectangle::new(bounds.top_left, Size::new(width, height));
    let pixels = &art.pixels;
    let art_width = art.size.width;
    let last_x = art.size.width - 1;
    let last_y = art.size.height - 1;
    let colors = (0..height).flat_map(move |ty| {
        let sy = ((ty as f32 / scale) as u32).min(last_y);
        (0..width).map(move |tx| {
            let sx = ((tx as f32 / scale) as u32).min(last_x);
            C::from(pixels[(sy * art_width + sx) as usize])
        })
    });

    surface.fill_contiguous(&area, colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Extent;
    use crate::test_support::{RecordingSurface, test_profile};
    use alloc::vec;

    const ON: Rgb888 = Rgb888::new(0xcf, 0xe2, 0xff);
    const OFF: Rgb888 = Rgb888::new(0x1f, 0x1f, 0x1f);
    const BG: Rgb888 = Rgb888::new(0x12, 0x12, 0x12);

    #[test]
    fn test_binary_dots() {
        let profile = test_profile(Extent::new(3.0, 2.0), Extent::new(0.0, 0.0));
        let mut grid = PixelGrid::new(2, 2);
        grid.set(0, 1, true);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(2, 2)).unwrap();

        assert_eq!(
            surface.fills,
            vec![
                (Rectangle::new(Point::new(10, 5), Size::new(3, 2)), OFF),
                (Rectangle::new(Point::new(13, 5), Size::new(3, 2)), ON),
                (Rectangle::new(Point::new(10, 7), Size::new(3, 2)), OFF),
                (Rectangle::new(Point::new(13, 7), Size::new(3, 2)), OFF),
            ]
        );
    }

    #[test]
    fn test_separator_bars() {
        let profile = test_profile(Extent::new(3.0, 2.0), Extent::new(1.0, 2.0));
        let grid = PixelGrid::new(2, 3);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(2, 3)).unwrap();

        let bars: Vec<Rectangle> = surface
            .fills
            .iter()
            .filter(|(_, color)| *color == BG)
            .map(|(rect, _)| *rect)
            .collect();
        assert_eq!(
            bars,
            vec![
                // columns - 1 vertical bars, full panel height
                Rectangle::new(Point::new(13, 5), Size::new(1, 6)),
                Rectangle::new(Point::new(17, 5), Size::new(1, 6)),
                // rows - 1 horizontal bar, full panel width
                Rectangle::new(Point::new(10, 7), Size::new(11, 2)),
            ]
        );
        // separators come after all 6 dots
        assert!(surface.fills[..6].iter().all(|(_, color)| *color == OFF));
    }

    #[test]
    fn test_no_separators_without_spacing() {
        let profile = test_profile(Extent::new(2.0, 2.0), Extent::new(0.0, 0.0));
        let grid = PixelGrid::new(4, 4);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(4, 4)).unwrap();

        assert_eq!(surface.fills.len(), 16);
        assert!(surface.fills.iter().all(|(_, color)| *color != BG));
    }

    #[test]
    fn test_only_visible_area_is_drawn() {
        let profile = test_profile(Extent::new(1.0, 1.0), Extent::new(0.0, 0.0));
        let grid = PixelGrid::new(8, 8);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(6, 5)).unwrap();
        assert_eq!(surface.fills.len(), 30);
    }

    #[test]
    fn test_fractional_geometry_tiles() {
        let profile = test_profile(Extent::new(1.5, 1.5), Extent::new(0.0, 0.0));
        let grid = PixelGrid::new(1, 4);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(1, 4)).unwrap();

        // each dot starts where the previous one ended
        for pair in surface.fills.windows(2) {
            let (prev, _) = pair[0];
            let (next, _) = pair[1];
            assert_eq!(prev.top_left.x + prev.size.width as i32, next.top_left.x);
        }
    }

    #[test]
    fn test_heat_frame_colors() {
        let profile = test_profile(Extent::new(2.0, 2.0), Extent::new(0.0, 0.0));
        let heat = HeatGrid::from_counts(&[0, 1], 1, 1, 2);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Heat(&heat), PanelArea::new(1, 2)).unwrap();

        assert_eq!(surface.fills[0].1, Rgb888::new(0, 0, 255));
        assert_eq!(surface.fills[1].1, Rgb888::new(255, 0, 0));
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let profile = test_profile(Extent::new(3.0, 2.0), Extent::new(1.0, 1.0));
        let mut grid = PixelGrid::new(3, 3);
        grid.set(1, 1, true);

        let mut surface = RecordingSurface::new(40, 40);
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(3, 3)).unwrap();
        let first = surface.fills.clone();
        surface.fills.clear();
        render(&mut surface, &profile, Frame::Binary(&grid), PanelArea::new(3, 3)).unwrap();
        assert_eq!(surface.fills, first);
    }

    #[test]
    fn test_background_art_fitted() {
        let art = BackgroundArt::new(
            2,
            1,
            vec![Rgb888::new(1, 2, 3), Rgb888::new(4, 5, 6)],
        )
        .unwrap();
        let mut surface = RecordingSurface::new(8, 8);
        draw_background_art(&mut surface, &art).unwrap();

        assert_eq!(
            surface.fills,
            vec![(Rectangle::new(Point::zero(), Size::new(8, 8)), Rgb888::WHITE)]
        );
        let (area, colors) = &surface.blits[0];
        assert_eq!(*area, Rectangle::new(Point::zero(), Size::new(8, 4)));
        assert_eq!(colors.len(), 32);
        assert_eq!(colors[0], Rgb888::new(1, 2, 3));
        assert_eq!(colors[3], Rgb888::new(1, 2, 3));
        assert_eq!(colors[4], Rgb888::new(4, 5, 6));
        assert_eq!(colors[31], Rgb888::new(4, 5, 6));
    }

    #[test]
    fn test_background_art_size_check() {
        assert!(BackgroundArt::new(2, 2, vec![Rgb888::BLACK; 3]).is_err());
        assert!(BackgroundArt::new(0, 0, Vec::new()).is_err());
    }
}
