//! Raster and error types shared by decoding and resizing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a format we can sniff (JPEG or PNG).
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Upright correction carried by an EXIF orientation tag.
///
/// The eight tag values reduce to a number of clockwise quarter turns
/// followed by an optional left/right mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub quarter_turns: u8,
    pub mirror: bool,
}

impl Orientation {
    pub const UPRIGHT: Orientation = Orientation {
        quarter_turns: 0,
        mirror: false,
    };

    /// Map a raw tag value; anything outside 1-8 is upright.
    pub fn from_exif(value: u32) -> Self {
        let (quarter_turns, mirror) = match value {
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => (0, false),
        };
        Self {
            quarter_turns,
            mirror,
        }
    }

    pub fn is_upright(self) -> bool {
        self.quarter_turns % 4 == 0 && !self.mirror
    }
}

/// RGB8 raster, row-major, 3 bytes per pixel.
///
/// A zero dimension means "not loaded" to every engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Single-color raster, handy for backgrounds and tests.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: rgb.repeat(count),
        }
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// `None` when the buffer length does not match the dimensions.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        let px = self.pixels.get(idx..idx + 3)?;
        Some([px[0], px[1], px[2]])
    }

    /// True when there is nothing to draw: a zero dimension, or a buffer
    /// whose length does not match the dimensions.
    pub fn is_empty(&self) -> bool {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3));
        self.width == 0 || self.height == 0 || expected != Some(self.pixels.len())
    }
}
