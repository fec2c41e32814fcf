use thiserror::Error;

use crate::document::DocumentId;

#[derive(Error, Debug)]
pub enum StampError {
    /// Base raster, signature raster, or PDF structure could not be decoded.
    #[error("Failed to decode: {0}")]
    DecodeError(String),

    /// A styled length such as `"250px"` was not a usable number.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Preview (or native) size cannot be used to derive a scale factor.
    #[error("Degenerate layout: {0}")]
    DegenerateLayout(String),

    /// Signature encoding the PDF backend cannot embed.
    #[error("Unsupported signature image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("Signature storage failed: {0}")]
    Storage(String),

    /// A save target could not deliver a finished export.
    #[error("Save failed: {0}")]
    Save(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StampError {
    /// Short machine-readable kind, used by UI layers to pick a message.
    pub fn kind(&self) -> &'static str {
        match self {
            StampError::DecodeError(_) => "decode_error",
            StampError::InvalidDimension(_) => "invalid_dimension",
            StampError::DegenerateLayout(_) => "degenerate_layout",
            StampError::UnsupportedImageFormat(_) => "unsupported_image_format",
            StampError::UnsupportedDocumentType(_) => "unsupported_document_type",
            StampError::FileTooLarge { .. } => "file_too_large",
            StampError::UnknownDocument(_) => "unknown_document",
            StampError::InvalidDocumentId(_) => "invalid_document_id",
            StampError::Storage(_) => "storage",
            StampError::Save(_) => "save",
            StampError::Config(_) => "config",
            StampError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, StampError>;
