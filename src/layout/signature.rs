//! Signature image decoding.

use crate::error::{Result, SheetPdfError};

/// Decoded 8-bit RGB pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes.
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Decode a PNG or JPEG.
    ///
    /// Transparent pixels are composited onto white, since signatures are
    /// usually scanned or drawn on a transparent canvas and the page is white.
    ///
    /// # Errors
    ///
    /// Returns [`SheetPdfError::ImageDecode`] when the format is not
    /// recognised or the data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| SheetPdfError::image_decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        if width == 0 || height == 0 {
            return Err(SheetPdfError::image_decode("image has no pixels"));
        }

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = u16::from(a);
            for channel in [r, g, b] {
                let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
                rgb.push(blended as u8);
            }
        }

        Ok(Self { width, height, rgb })
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Largest size with this aspect ratio that fits inside `max_w` x `max_h`.
    pub fn fit_within(&self, max_w: f32, max_h: f32) -> (f32, f32) {
        let ratio = self.aspect_ratio();
        if max_w / max_h > ratio {
            (max_h * ratio, max_h)
        } else {
            (max_w, max_w / ratio)
        }
    }
}
