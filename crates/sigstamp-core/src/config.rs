//! Configuration for stamping and exporting
//!
//! All keys are optional, so an empty TOML document yields
//! [`StampConfig::default`]. A config file that is missing or unreadable is
//! an error; callers that want defaults in that case should not load one.

use anyhow::Context;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::StampError;

/// Default upload limit (100MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

/// Runtime settings shared by the core and the web bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    /// Prefix prepended to the original filename on export
    pub filename_prefix: String,
    /// Key of the single persisted signature slot
    pub storage_key: String,
    /// Width of a freshly placed overlay, in preview pixels
    pub default_overlay_width: f64,
    /// Height of a freshly placed overlay, in preview pixels
    pub default_overlay_height: f64,
    /// Largest document accepted at ingestion, in bytes
    pub max_file_size: usize,
    /// Filter used when scaling the signature onto a raster
    pub resize_filter: ResizeFilter,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "signed_".to_string(),
            storage_key: "signature".to_string(),
            default_overlay_width: 250.0,
            default_overlay_height: 150.0,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            resize_filter: ResizeFilter::Triangle,
        }
    }
}

impl StampConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the values fail [`StampConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, StampError> {
        let config: StampConfig =
            toml::from_str(s).map_err(|e| StampError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StampError> {
        if !(self.default_overlay_width > 0.0 && self.default_overlay_width.is_finite()) {
            return Err(StampError::Config(format!(
                "default_overlay_width must be positive, got {}",
                self.default_overlay_width
            )));
        }
        if !(self.default_overlay_height > 0.0 && self.default_overlay_height.is_finite()) {
            return Err(StampError::Config(format!(
                "default_overlay_height must be positive, got {}",
                self.default_overlay_height
            )));
        }
        if self.max_file_size == 0 {
            return Err(StampError::Config(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(StampError::Config("storage_key must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Resampling filter for signature scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
