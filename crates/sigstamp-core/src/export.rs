//! Export dispatch
//!
//! Routes a document to the compositor for its kind, maps the placement into
//! that document's native space, and hands the finished bytes to a
//! [`SaveTarget`]. With no signature or no placement the export is an
//! unmodified copy.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StampConfig;
use crate::coords::{Size, TargetRect, TargetSpace};
use crate::document::{Document, DocumentKind};
use crate::error::Result;
use crate::overlay::Placement;
use crate::pdf::{PdfCompositor, PDF_OUTPUT_MIME};
use crate::raster::{RasterCompositor, RASTER_OUTPUT_MIME};
use crate::signature::SignatureImage;

/// Longest filename a [`DirectoryTarget`] will write, in characters
const MAX_FILENAME_CHARS: usize = 200;

const FALLBACK_FILENAME: &str = "document";

/// A finished document, ready to be saved or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
    pub mime_type: String,
}

/// Somewhere an [`ExportResult`] can be delivered
pub trait SaveTarget {
    fn save(&self, result: &ExportResult) -> Result<()>;
}

/// Produce the signed copy of `document`.
///
/// Errors from decoding or compositing are returned as they are; nothing is
/// produced on failure.
#[tracing::instrument(
    skip(document, signature, placement, config),
    fields(name = %document.name(), kind = ?document.kind())
)]
pub fn export_document(
    document: &Document,
    signature: Option<&SignatureImage>,
    placement: Option<&Placement>,
    config: &StampConfig,
) -> Result<ExportResult> {
    let (bytes, mime_type) = match document.kind() {
        DocumentKind::Raster => {
            let loaded = RasterCompositor::from_config(config).load(document.bytes())?;
            let stamp = stamp_for(signature, placement, loaded.native_size(), TargetSpace::Raster)?;
            // Passthrough keeps the original encoding, so its MIME type too
            let mime_type = if stamp.is_some() {
                RASTER_OUTPUT_MIME
            } else {
                document.mime_type()
            };
            (loaded.composite(stamp)?, mime_type.to_string())
        }
        DocumentKind::Pdf => {
            let loaded = PdfCompositor.load(document.bytes())?;
            let stamp = stamp_for(signature, placement, loaded.native_size(), TargetSpace::Pdf)?;
            (loaded.composite(stamp)?, PDF_OUTPUT_MIME.to_string())
        }
    };

    let result = ExportResult {
        bytes,
        suggested_filename: format!("{}{}", config.filename_prefix, document.name()),
        mime_type,
    };

    tracing::info!(
        filename = %result.suggested_filename,
        bytes = result.bytes.len(),
        signed = signature.is_some() && placement.is_some(),
        "export complete"
    );
    Ok(result)
}

/// Export and deliver in one step. The target only sees complete results.
pub fn export_and_save<T: SaveTarget + ?Sized>(
    document: &Document,
    signature: Option<&SignatureImage>,
    placement: Option<&Placement>,
    config: &StampConfig,
    target: &T,
) -> Result<ExportResult> {
    let result = export_document(document, signature, placement, config)?;
    target.save(&result)?;
    Ok(result)
}

fn stamp_for<'s>(
    signature: Option<&'s SignatureImage>,
    placement: Option<&Placement>,
    native: Size,
    space: TargetSpace,
) -> Result<Option<(&'s SignatureImage, TargetRect)>> {
    match signature.zip(placement) {
        Some((signature, placement)) => {
            let rect = placement.target_rect(native, space)?;
            tracing::debug!(?rect, ?space, "placement mapped");
            Ok(Some((signature, rect)))
        }
        None => Ok(None),
    }
}

/// Writes results as files into one directory
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a result with this suggested name ends up
    pub fn path_for(&self, suggested_filename: &str) -> PathBuf {
        self.dir.join(sanitize_filename(suggested_filename))
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&self, result: &ExportResult) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&result.suggested_filename);
        fs::write(&path, &result.bytes)?;
        tracing::debug!(path = %path.display(), "export written");
        Ok(())
    }
}

/// Collects results in memory
#[derive(Debug, Default)]
pub struct MemoryTarget {
    saved: RefCell<Vec<ExportResult>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> Vec<ExportResult> {
        self.saved.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.saved.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.borrow().is_empty()
    }
}

impl SaveTarget for MemoryTarget {
    fn save(&self, result: &ExportResult) -> Result<()> {
        self.saved.borrow_mut().push(result.clone());
        Ok(())
    }
}

/// Make a suggested filename safe to create inside a single directory.
///
/// Path separators and characters reserved on common filesystems become `_`,
/// control characters are dropped, surrounding whitespace and dots are
/// trimmed, and the result is capped at 200 characters.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => Some('_'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let trimmed: String = replaced
        .trim()
        .trim_matches('.')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect();

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed
    }
}
