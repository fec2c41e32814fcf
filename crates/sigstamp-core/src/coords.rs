//! Coordinate transformation between the on-screen preview and document space
//!
//! The preview is measured in CSS pixels with a top-left origin. Raster
//! targets share that orientation; PDF pages have their origin at the
//! bottom-left, so Y is flipped when mapping into point space.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StampError};
use crate::overlay::OverlayRect;

/// Width/height pair, in whatever unit the owning space uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Rectangle in target space: raster pixels (top-left origin) or PDF points
/// (bottom-left origin), depending on the [`TargetSpace`] it was mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TargetRect {
    /// Compositors only draw rectangles with finite coordinates and a
    /// non-negative size.
    pub fn ensure_drawable(&self) -> Result<()> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(StampError::DegenerateLayout(format!(
                "target rectangle is not finite: {:?}",
                self
            )));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(StampError::DegenerateLayout(format!(
                "target rectangle has a negative size: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Orientation of the space a rectangle is mapped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSpace {
    /// Pixel grid, origin top-left
    Raster,
    /// PDF point space, origin bottom-left
    Pdf,
}

/// Maps overlay rectangles from preview pixels into a document's native space.
///
/// Scale factors are independent per axis; the preview's aspect ratio does
/// not have to match the document's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    native: Size,
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    /// Build a mapper for a preview rendered at `preview` showing a document
    /// whose native size is `native`.
    ///
    /// Returns [`StampError::DegenerateLayout`] when either size has a zero,
    /// negative, or non-finite component.
    pub fn new(preview: Size, native: Size) -> Result<Self> {
        check_extent("preview width", preview.width)?;
        check_extent("preview height", preview.height)?;
        check_extent("native width", native.width)?;
        check_extent("native height", native.height)?;

        let scale_x = native.width / preview.width;
        let scale_y = native.height / preview.height;
        tracing::debug!(scale_x, scale_y, "coordinate mapper ready");

        Ok(Self {
            native,
            scale_x,
            scale_y,
        })
    }

    /// Per-axis scale factors (native units per preview pixel)
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    pub fn native(&self) -> Size {
        self.native
    }

    /// Map an overlay into the given target space. The overlay is trusted as
    /// given; no clamping happens here.
    pub fn map(&self, overlay: &OverlayRect, space: TargetSpace) -> TargetRect {
        let x = overlay.x * self.scale_x;
        let top = overlay.y * self.scale_y;
        let width = overlay.width * self.scale_x;
        let height = overlay.height * self.scale_y;

        let y = match space {
            TargetSpace::Raster => top,
            TargetSpace::Pdf => self.native.height - (top + height),
        };

        TargetRect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn map_raster(&self, overlay: &OverlayRect) -> TargetRect {
        self.map(overlay, TargetSpace::Raster)
    }

    pub fn map_pdf(&self, overlay: &OverlayRect) -> TargetRect {
        self.map(overlay, TargetSpace::Pdf)
    }

    /// Inverse of [`CoordinateMapper::map`]
    pub fn unmap(&self, rect: &TargetRect, space: TargetSpace) -> OverlayRect {
        let top = match space {
            TargetSpace::Raster => rect.y,
            TargetSpace::Pdf => self.native.height - rect.y - rect.height,
        };

        OverlayRect {
            x: rect.x / self.scale_x,
            y: top / self.scale_y,
            width: rect.width / self.scale_x,
            height: rect.height / self.scale_y,
        }
    }
}

fn check_extent(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StampError::DegenerateLayout(format!(
            "{} must be positive and finite, got {}",
            what, value
        )))
    }
}

/// Parse a styled length such as `"250px"`, `" 80 "` or `"12.5px"` into pixels.
pub fn parse_length(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let number = trimmed
        .strip_suffix("px")
        .or_else(|| trimmed.strip_suffix("PX"))
        .unwrap_or(trimmed)
        .trim_end();

    let value: f64 = number
        .parse()
        .map_err(|_| StampError::InvalidDimension(format!("not a pixel length: {:?}", input)))?;

    if !value.is_finite() || value < 0.0 {
        return Err(StampError::InvalidDimension(format!(
            "length must be a non-negative finite number: {:?}",
            input
        )));
    }
    Ok(value)
}

/// Scale `source` to fit inside `container` preserving aspect ratio, centered.
///
/// This is how a previously saved signature is redrawn into the capture canvas.
pub fn fit_centered(source: Size, container: Size) -> Result<TargetRect> {
    check_extent("source width", source.width)?;
    check_extent("source height", source.height)?;

    let scale = (container.width / source.width).min(container.height / source.height);
    let width = source.width * scale;
    let height = source.height * scale;

    Ok(TargetRect {
        x: container.width / 2.0 - width / 2.0,
        y: container.height / 2.0 - height / 2.0,
        width,
        height,
    })
}
