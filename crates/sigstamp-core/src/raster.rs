//! Raster compositing
//!
//! Decodes the base image at its native pixel size, scales the signature into
//! the mapped rectangle, alpha-blends it on top and re-encodes as PNG.

use image::imageops::{self, FilterType};
use image::{ImageFormat, Pixel, RgbaImage};
use std::io::Cursor;

use crate::config::StampConfig;
use crate::coords::{Size, TargetRect};
use crate::error::{Result, StampError};
use crate::signature::SignatureImage;

pub const RASTER_OUTPUT_MIME: &str = "image/png";

/// Draws a signature over raster documents
#[derive(Debug, Clone, Copy)]
pub struct RasterCompositor {
    filter: FilterType,
}

impl Default for RasterCompositor {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl RasterCompositor {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn from_config(config: &StampConfig) -> Self {
        Self::new(config.resize_filter.into())
    }

    /// Decode the base image. Nothing can be drawn until this has succeeded.
    pub fn load<'a>(&self, bytes: &'a [u8]) -> Result<LoadedRaster<'a>> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| StampError::DecodeError(format!("base image: {}", e)))?
            .to_rgba8();

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "base raster decoded"
        );

        Ok(LoadedRaster {
            source: bytes,
            image,
            filter: self.filter,
        })
    }
}

/// A decoded base image, ready to receive a signature
#[derive(Debug)]
pub struct LoadedRaster<'a> {
    source: &'a [u8],
    image: RgbaImage,
    filter: FilterType,
}

impl LoadedRaster<'_> {
    /// Intrinsic pixel dimensions
    pub fn native_size(&self) -> Size {
        Size::new(self.image.width() as f64, self.image.height() as f64)
    }

    /// Draw `signature` into `rect` (raster space) and encode as PNG.
    ///
    /// With no stamp the source bytes are returned as they are.
    pub fn composite(self, stamp: Option<(&SignatureImage, TargetRect)>) -> Result<Vec<u8>> {
        let Some((signature, rect)) = stamp else {
            return Ok(self.source.to_vec());
        };

        let mut canvas = self.image;
        draw_signature(&mut canvas, signature, &rect, self.filter)?;
        encode_png(&canvas)
    }
}

fn draw_signature(
    canvas: &mut RgbaImage,
    signature: &SignatureImage,
    rect: &TargetRect,
    filter: FilterType,
) -> Result<()> {
    rect.ensure_drawable()?;

    let ink = image::load_from_memory(signature.as_bytes())
        .map_err(|e| StampError::DecodeError(format!("signature image: {}", e)))?
        .to_rgba8();

    let width = rect.width.round();
    let height = rect.height.round();
    if width < 1.0 || height < 1.0 {
        tracing::debug!(?rect, "signature rectangle rounds to nothing, skipping draw");
        return Ok(());
    }
    let left = rect.x.round();
    let top = rect.y.round();

    let (canvas_w, canvas_h) = (canvas.width() as f64, canvas.height() as f64);
    let visible_x = left.max(0.0)..(left + width).min(canvas_w);
    let visible_y = top.max(0.0)..(top + height).min(canvas_h);
    if visible_x.is_empty() || visible_y.is_empty() {
        tracing::debug!(?rect, "signature rectangle is off the canvas, skipping draw");
        return Ok(());
    }

    if width <= canvas_w * 4.0 && height <= canvas_h * 4.0 {
        let scaled = imageops::resize(&ink, width as u32, height as u32, filter);
        imageops::overlay(canvas, &scaled, left as i64, top as i64);
        return Ok(());
    }

    // Far larger than the canvas: sample only the pixels that land on it
    // rather than scaling the whole signature first.
    tracing::debug!(?rect, "sampling visible part of oversized signature");
    for y in visible_y.start as u32..visible_y.end as u32 {
        let v = ((y as f64 + 0.5 - top) / height) as f32;
        for x in visible_x.start as u32..visible_x.end as u32 {
            let u = ((x as f64 + 0.5 - left) / width) as f32;
            if let Some(px) = imageops::sample_bilinear(&ink, u, v) {
                canvas.get_pixel_mut(x, y).blend(&px);
            }
        }
    }
    Ok(())
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| StampError::DecodeError(format!("PNG encoding failed: {}", e)))?;
    Ok(out)
}

/// One-shot form: decode `base`, draw `signature` at `rect` when both are
/// present, encode.
pub fn composite_raster(
    base: &[u8],
    signature: Option<&SignatureImage>,
    rect: Option<TargetRect>,
) -> Result<Vec<u8>> {
    let loaded = RasterCompositor::default().load(base)?;
    loaded.composite(signature.zip(rect))
}
