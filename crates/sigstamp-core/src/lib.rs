//! Signature stamping for images and PDFs
//!
//! A user places a signature over a scaled-down preview of a document. This
//! crate maps that placement into the document's native space and burns the
//! signature in:
//! - raster documents are decoded, composited, and re-encoded as PNG
//!   (`image`)
//! - PDFs get the signature as an image XObject drawn on page 1 only (`lopdf`)
//!
//! Everything here is synchronous and side-effect free apart from the
//! [`SaveTarget`] and [`SignatureSlot`] implementations.

pub mod config;
pub mod coords;
pub mod document;
pub mod error;
pub mod export;
pub mod overlay;
pub mod pdf;
pub mod raster;
pub mod signature;

pub use config::{ResizeFilter, StampConfig};
pub use coords::{fit_centered, parse_length, CoordinateMapper, Size, TargetRect, TargetSpace};
pub use document::{format_size_kb, Document, DocumentId, DocumentInfo, DocumentKind, DocumentSet};
pub use error::{Result, StampError};
pub use export::{
    export_and_save, export_document, sanitize_filename, DirectoryTarget, ExportResult,
    MemoryTarget, SaveTarget,
};
pub use overlay::{OverlayRect, Placement};
pub use pdf::{composite_pdf, LoadedPdf, PageBox, PdfCompositor};
pub use raster::{composite_raster, LoadedRaster, RasterCompositor};
pub use signature::{
    FileSlot, MemorySlot, SignatureFormat, SignatureImage, SignatureSlot, SignatureStore,
};
