//! Snapshot rendering: captured raster images and the paginated documents
//! built from them.
//!
//! ```text
//! SnapshotSource ──capture──▶ RasterSnapshot ──paginate──▶ PaginatedDocument ──PdfRenderer──▶ PDF bytes
//! ```

pub mod capture;
pub mod paginate;
pub mod pdf;

use crate::{Error, Result};
#[cfg(feature = "png")]
use base64::Engine as _;

/// Background colour used to flatten transparent pixels
pub const WHITE: [u8; 3] = [255, 255, 255];

#[cfg(feature = "png")]
const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// An in-memory bitmap of the visual state, packed RGB8.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSnapshot {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl RasterSnapshot {
    /// Wrap packed RGB8 pixels; `pixels.len()` must be `width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(Error::CaptureError(format!(
                "expected {} RGB bytes for {}x{}, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Composite packed RGBA8 pixels over `background`.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8], background: [u8; 3]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Error::CaptureError(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for px in rgba.chunks_exact(4) {
            let alpha = px[3] as u32;
            for c in 0..3 {
                let blended = (px[c] as u32 * alpha + background[c] as u32 * (255 - alpha) + 127) / 255;
                pixels.push(blended as u8);
            }
        }
        Self::from_rgb(width, height, pixels)
    }

    /// A single-colour snapshot
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode a PNG capture, flattening transparency onto `background`.
    #[cfg(feature = "png")]
    pub fn from_png(bytes: &[u8], background: [u8; 3]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| Error::CaptureError(format!("PNG decode: {}", e)))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(width, height, decoded.as_raw(), background)
    }

    /// Decode a `data:image/png;base64,...` URL as produced by canvas capture.
    #[cfg(feature = "png")]
    pub fn from_data_url(url: &str, background: [u8; 3]) -> Result<Self> {
        let payload = url.strip_prefix(PNG_DATA_URL_PREFIX).ok_or_else(|| {
            Error::CaptureError("not a base64 PNG data URL".to_string())
        })?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::CaptureError(format!("base64: {}", e)))?;
        Self::from_png(&bytes, background)
    }

    /// Encode as a PNG data URL.
    #[cfg(feature = "png")]
    pub fn to_data_url(&self) -> Result<String> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| Error::RenderError("pixel buffer does not match dimensions".into()))?;
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| Error::RenderError(format!("PNG encode: {}", e)))?;
        Ok(format!(
            "{}{}",
            PNG_DATA_URL_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(png.into_inner())
        ))
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
