//! Decoded raster frames.
//!
//! A [`Frame`] is the unit of capture: one decoded RGBA raster. Artifact
//! identity is always computed from decoded pixels, never from encoder
//! output, so the same rendering hashes identically no matter how it was
//! compressed on the way in.

use crate::result::{RevelarError, RevelarResult};
use image::RgbaImage;

/// One decoded raster: RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Create a frame from raw RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match the dimensions.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> RevelarResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RevelarError::ImageProcessing {
                message: format!(
                    "RGBA buffer of {} bytes does not match a {width}x{height} frame",
                    data.len()
                ),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a frame from a decoded image.
    #[must_use]
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            data: image.as_raw().clone(),
            width: image.width(),
            height: image.height(),
        }
    }

    /// Decode PNG bytes into a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a decodable PNG.
    pub fn from_png_bytes(bytes: &[u8]) -> RevelarResult<Self> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| RevelarError::ImageProcessing {
                message: format!("failed to decode PNG: {e}"),
            })?;
        let rgba = decoded.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            data: rgba.into_raw(),
        })
    }

    /// Frame width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels in the frame.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Iterate pixels as packed 32-bit ARGB values, row-major.
    ///
    /// This is the canonical hashing input: content identity is defined
    /// over these values, not over any encoded byte stream.
    pub fn argb_pixels(&self) -> impl Iterator<Item = u32> + '_ {
        self.data.chunks_exact(4).map(|px| {
            (u32::from(px[3]) << 24) | (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2])
        })
    }
}
