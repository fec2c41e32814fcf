//! Overlay rectangle model
//!
//! The overlay is the box the user drags and resizes over the preview. It is
//! stored in preview pixels together with the preview size it was placed
//! against, so it can always be re-mapped from the layout that produced it.

use serde::{Deserialize, Serialize};

use crate::config::StampConfig;
use crate::coords::{parse_length, CoordinateMapper, Size, TargetRect, TargetSpace};
use crate::error::{Result, StampError};

/// Signature box in preview pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl OverlayRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Freshly shown overlay: configured default size, anchored at the top-left
    pub fn default_for(config: &StampConfig) -> Self {
        Self::new(
            0.0,
            0.0,
            config.default_overlay_width,
            config.default_overlay_height,
        )
    }

    /// Build from the resize widget's styled output, e.g. `("250px", "150px")`
    pub fn from_styled(x: f64, y: f64, width: &str, height: &str) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(StampError::InvalidDimension(format!(
                "overlay position must be finite, got ({}, {})",
                x, y
            )));
        }
        Ok(Self::new(x, y, parse_length(width)?, parse_length(height)?))
    }

    /// Result of a drag: the new top-left, never negative
    pub fn drag_to(&self, x: f64, y: f64) -> Self {
        Self {
            x: x.max(0.0),
            y: y.max(0.0),
            ..*self
        }
    }

    /// Result of a resize: the widget reports both the new size and the new
    /// position, since dragging a top or left handle moves the origin.
    pub fn resize_to(&self, width: f64, height: f64, x: f64, y: f64) -> Self {
        Self {
            x: x.max(0.0),
            y: y.max(0.0),
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Keep the rectangle inside `bounds`. Oversized rectangles shrink to the
    /// bounds; the position is then pulled back inside.
    pub fn clamp_within(&self, bounds: Size) -> Self {
        let width = self.width.clamp(0.0, bounds.width.max(0.0));
        let height = self.height.clamp(0.0, bounds.height.max(0.0));
        let x = self.x.clamp(0.0, (bounds.width - width).max(0.0));
        let y = self.y.clamp(0.0, (bounds.height - height).max(0.0));
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Re-project onto a preview that was re-rendered at a different size
    pub fn rescale(&self, from: Size, to: Size) -> Result<Self> {
        let mapper = CoordinateMapper::new(from, to)?;
        let mapped = mapper.map_raster(self);
        Ok(Self::new(mapped.x, mapped.y, mapped.width, mapped.height))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// An overlay plus the preview size it was placed against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub overlay: OverlayRect,
    pub preview: Size,
}

impl Placement {
    pub fn new(overlay: OverlayRect, preview: Size) -> Self {
        Self { overlay, preview }
    }

    pub fn with_overlay(&self, overlay: OverlayRect) -> Self {
        Self {
            overlay,
            preview: self.preview,
        }
    }

    /// Map this placement onto a document whose native size is `native`
    pub fn target_rect(&self, native: Size, space: TargetSpace) -> Result<TargetRect> {
        let mapper = CoordinateMapper::new(self.preview, native)?;
        Ok(mapper.map(&self.overlay, space))
    }
}
