//! Test doubles shared by the unit tests

use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::profile::{DisplayProfile, Extent};

/// Draw target that records primitive calls instead of storing pixels.
pub struct RecordingSurface {
    size: Size,
    /// Every `fill_solid` call, in order
    pub fills: Vec<(Rectangle, Rgb888)>,
    /// Every `fill_contiguous` call with its collected colors
    pub blits: Vec<(Rectangle, Vec<Rgb888>)>,
    /// Pixels drawn one by one through `draw_iter`
    pub loose_pixels: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            fills: Vec::new(),
            blits: Vec::new(),
            loose_pixels: 0,
        }
    }
}

impl OriginDimensions for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for RecordingSurface {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.loose_pixels += pixels.into_iter().count();
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.blits.push((*area, colors.into_iter().collect()));
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fills.push((*area, color));
        Ok(())
    }
}

/// OLED palette at offset (10, 5) with the given dot size and spacing.
pub fn test_profile(pixel_size: Extent, pixel_space: Extent) -> DisplayProfile {
    DisplayProfile {
        name: "TEST",
        color_background: Rgb888::new(0x12, 0x12, 0x12),
        color_pixel_on: Rgb888::new(0xcf, 0xe2, 0xff),
        color_pixel_off: Rgb888::new(0x1f, 0x1f, 0x1f),
        pixel_size,
        pixel_space,
        offset: Extent::new(10.0, 5.0),
        art: None,
    }
}
