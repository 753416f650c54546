//! PNG output encoder.
//!
//! Pure Rust PNG encoding using the `png` crate. The resolution is recorded in
//! the `pHYs` chunk when one is given.

use crate::error::Result;
use crate::framebuffer::Framebuffer;

const METERS_PER_INCH: f64 = 0.0254;

/// PNG encoder for framebuffer output.
pub struct PngEncoder;

impl PngEncoder {
    /// Encode a framebuffer to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes(fb: &Framebuffer) -> Result<Vec<u8>> {
        Self::to_bytes_with_dpi(fb, None)
    }

    /// Encode a framebuffer to PNG bytes, recording `dpi` as the physical
    /// pixel density.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes_with_dpi(fb: &Framebuffer, dpi: Option<f64>) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();

        {
            let mut encoder = png::Encoder::new(&mut buffer, fb.width(), fb.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            if let Some(dpi) = dpi {
                let ppu = (dpi / METERS_PER_INCH).round() as u32;
                encoder.set_pixel_dims(Some(png::PixelDimensions {
                    xppu: ppu,
                    yppu: ppu,
                    unit: png::Unit::Meter,
                }));
            }

            let mut writer = encoder.write_header()?;
            // Use compact pixels to handle stride padding
            writer.write_image_data(&fb.to_compact_pixels())?;
        }

        Ok(buffer)
    }
}
