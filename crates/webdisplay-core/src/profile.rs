//! Panel profiles
//!
//! A [`DisplayProfile`] describes how one physical panel type is drawn: the
//! colors of lit and unlit pixels, the size of a pixel dot, the gap between
//! dots and where the first dot sits on the rendering surface. Geometry is
//! kept fractional so the reference artwork can be matched exactly; the
//! renderer snaps it to whole surface pixels.
//!
//! Type codes follow the device firmware's display type setting. Code 0 means
//! "no display configured" and never resolves to a drawable profile.

use embedded_graphics::pixelcolor::Rgb888;
use heapless::Vec;

use crate::error::ProfileError;

/// Maximum number of entries (including the reserved "none" slot) in a registry.
pub const MAX_PROFILES: usize = 16;

/// Validated device type code, guaranteed to index a drawable profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceType(u8);

impl DeviceType {
    /// Raw type code as reported by the device.
    pub const fn code(self) -> u8 {
        self.0
    }
}

/// A pair of fractional surface measurements (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub x: f32,
    pub y: f32,
}

impl Extent {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Multiply both components by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Geometry and palette of one panel type.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayProfile {
    /// Controller name, used in logs and window titles
    pub name: &'static str,
    /// Color cut through the gaps between pixel dots
    pub color_background: Rgb888,
    /// Fill of a lit pixel
    pub color_pixel_on: Rgb888,
    /// Fill of an unlit pixel
    pub color_pixel_off: Rgb888,
    /// Size of a single pixel dot
    pub pixel_size: Extent,
    /// Gap between neighbouring dots
    pub pixel_space: Extent,
    /// Surface position of the top-left dot
    pub offset: Extent,
    /// File name of the background artwork, if the panel has one.
    ///
    /// The device firmware ships its board artwork as SVG; the simulator
    /// loads PNG renderings of those images from its `--assets` directory.
    pub art: Option<&'static str>,
}

impl DisplayProfile {
    /// Distance between the starts of two neighbouring dots.
    pub fn pitch(&self) -> Extent {
        Extent::new(
            self.pixel_size.x + self.pixel_space.x,
            self.pixel_size.y + self.pixel_space.y,
        )
    }

    /// Copy of this profile with all geometry multiplied by `factor`.
    ///
    /// Colors and art are kept; the art itself is always fitted to the surface.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            pixel_size: self.pixel_size.scaled(factor),
            pixel_space: self.pixel_space.scaled(factor),
            offset: self.offset.scaled(factor),
            ..self.clone()
        }
    }
}

/// Fixed table of panel profiles indexed by device type code.
///
/// Slot 0 is reserved for "no device" and is never returned by
/// [`ProfileRegistry::profile_for`].
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<DisplayProfile, MAX_PROFILES>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    /// Build a registry from drawable profiles.
    ///
    /// `drawable[0]` gets type code 1, `drawable[1]` code 2, and so on.
    pub fn new(
        drawable: impl IntoIterator<Item = DisplayProfile>,
    ) -> Result<Self, ProfileError> {
        let mut profiles = Vec::new();
        profiles
            .push(NONE_PROFILE)
            .map_err(|_| ProfileError::TableFull)?;
        for profile in drawable {
            profiles.push(profile).map_err(|_| ProfileError::TableFull)?;
        }
        Ok(Self { profiles })
    }

    /// Registry seeded with every panel the device firmware can drive.
    pub fn builtin() -> Self {
        let mut profiles = Vec::new();
        for profile in BUILTIN_PROFILES {
            // BUILTIN_PROFILES is far smaller than MAX_PROFILES
            let _ = profiles.push(profile);
        }
        Self { profiles }
    }

    /// Same table with every art reference removed.
    ///
    /// Type changes then take effect immediately instead of waiting for an
    /// asset load.
    pub fn without_art(mut self) -> Self {
        for profile in self.profiles.iter_mut() {
            profile.art = None;
        }
        self
    }

    /// Replace every drawable profile by a copy scaled by `factor`.
    pub fn scaled(mut self, factor: f32) -> Self {
        for profile in self.profiles.iter_mut().skip(1) {
            *profile = profile.scaled(factor);
        }
        self
    }

    /// Number of slots, including the reserved "none" slot.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false: slot 0 exists in every registry.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Whether `code` refers to a drawable profile.
    pub fn is_valid(&self, code: i64) -> bool {
        code >= 1 && (code as u64) < self.profiles.len() as u64
    }

    /// Look up the profile for a type code reported by the device.
    ///
    /// "No device" (0) and unknown codes are rejected identically.
    pub fn profile_for(&self, code: i64) -> Result<(DeviceType, &DisplayProfile), ProfileError> {
        if !self.is_valid(code) {
            return Err(ProfileError::NotDrawable(code));
        }
        let device = DeviceType(code as u8);
        Ok((device, &self.profiles[code as usize]))
    }

    /// Profile of an already validated device type.
    pub fn get(&self, device: DeviceType) -> &DisplayProfile {
        &self.profiles[device.0 as usize]
    }
}

/// Build an opaque color from a `0xRRGGBB` literal.
const fn hex_color(rgb: u32) -> Rgb888 {
    Rgb888::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Placeholder occupying slot 0.
const NONE_PROFILE: DisplayProfile = DisplayProfile {
    name: "None",
    color_background: hex_color(0x000000),
    color_pixel_on: hex_color(0x000000),
    color_pixel_off: hex_color(0x000000),
    pixel_size: Extent::new(0.0, 0.0),
    pixel_space: Extent::new(0.0, 0.0),
    offset: Extent::new(0.0, 0.0),
    art: None,
};

/// Nokia 5110 style 84x48 LCD.
const PCD8544: DisplayProfile = DisplayProfile {
    name: "PCD8544",
    color_background: hex_color(0x99ab90),
    color_pixel_on: hex_color(0x3f3e64),
    color_pixel_off: hex_color(0x788463),
    pixel_size: Extent::new(12.1, 14.1),
    pixel_space: Extent::new(2.0, 3.0),
    offset: Extent::new(154.0, 418.0),
    art: Some("PCD8544.png"),
};

/// 128x64 OLED controllers all share the same board artwork.
const fn oled_128x64(name: &'static str) -> DisplayProfile {
    DisplayProfile {
        name,
        color_background: hex_color(0x121212),
        color_pixel_on: hex_color(0xcfe2ff),
        color_pixel_off: hex_color(0x1f1f1f),
        pixel_size: Extent::new(8.76, 7.64),
        pixel_space: Extent::new(1.0, 2.0),
        offset: Extent::new(116.0, 362.0),
        art: Some("SH1106.png"),
    }
}

const BUILTIN_PROFILES: [DisplayProfile; 6] = [
    NONE_PROFILE,
    PCD8544,
    oled_128x64("SSD1306"),
    oled_128x64("SH1106"),
    oled_128x64("SSD1309"),
    oled_128x64("ST7567_GM12864I_59N"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_size() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_none_and_out_of_range_rejected_identically() {
        let registry = ProfileRegistry::builtin();
        let size = registry.len() as i64;

        assert_eq!(registry.profile_for(0), Err(ProfileError::NotDrawable(0)));
        assert_eq!(
            registry.profile_for(size),
            Err(ProfileError::NotDrawable(size))
        );
        assert!(registry.profile_for(size + 100).is_err());
        assert!(registry.profile_for(-1).is_err());
    }

    #[test]
    fn test_lookup_valid_codes() {
        let registry = ProfileRegistry::builtin();

        let (device, profile) = registry.profile_for(1).unwrap();
        assert_eq!(device.code(), 1);
        assert_eq!(profile.name, "PCD8544");

        let (device, profile) = registry.profile_for(3).unwrap();
        assert_eq!(device.code(), 3);
        assert_eq!(profile.name, "SH1106");
        assert_eq!(profile.color_pixel_on, Rgb888::new(0xcf, 0xe2, 0xff));
        assert_eq!(registry.get(device), profile);
    }

    #[test]
    fn test_custom_registry_numbering() {
        let registry = ProfileRegistry::new([PCD8544]).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_valid(1));
        assert!(!registry.is_valid(2));
    }

    #[test]
    fn test_custom_registry_overflow() {
        let many = core::iter::repeat_n(PCD8544, MAX_PROFILES);
        assert_eq!(
            ProfileRegistry::new(many).unwrap_err(),
            ProfileError::TableFull
        );
    }

    #[test]
    fn test_builtin_art_is_png() {
        let registry = ProfileRegistry::builtin();
        for code in 1..registry.len() as i64 {
            let (_, profile) = registry.profile_for(code).unwrap();
            assert!(profile.art.is_some_and(|art| art.ends_with(".png")));
        }
    }

    #[test]
    fn test_without_art() {
        let registry = ProfileRegistry::builtin().without_art();
        let (_, profile) = registry.profile_for(2).unwrap();
        assert_eq!(profile.art, None);
    }

    #[test]
    fn test_scaled_geometry() {
        let profile = PCD8544.scaled(0.5);
        assert_eq!(profile.offset, Extent::new(77.0, 209.0));
        assert_eq!(profile.pixel_space, Extent::new(1.0, 1.5));
        assert_eq!(profile.color_pixel_on, PCD8544.color_pixel_on);
        let pitch = profile.pitch();
        assert!(pitch.x > 7.049 && pitch.x < 7.051);
        assert!(pitch.y > 8.549 && pitch.y < 8.551);
    }
}
