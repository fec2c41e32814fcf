//! Session documents and their per-document overlays
//!
//! Documents are keyed by an identifier assigned at ingestion, so two drops of
//! the same file are still two independent entries with independent overlays.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::config::StampConfig;
use crate::coords::Size;
use crate::error::{Result, StampError};
use crate::export::{export_document, ExportResult};
use crate::overlay::{OverlayRect, Placement};
use crate::signature::SignatureImage;

pub const PDF_MIME: &str = "application/pdf";

/// Identifier issued when a document enters the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    fn generate() -> Self {
        DocumentId(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(DocumentId)
            .map_err(|_| StampError::InvalidDocumentId(s.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Which compositor a document routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Raster,
    Pdf,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == PDF_MIME {
            Ok(DocumentKind::Pdf)
        } else if essence.starts_with("image/") && essence.len() > "image/".len() {
            Ok(DocumentKind::Raster)
        } else {
            Err(StampError::UnsupportedDocumentType(mime.to_string()))
        }
    }
}

/// Immutable document as selected or dropped by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    name: String,
    mime_type: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

impl Document {
    /// Validate and wrap a file. A fresh identifier is assigned every time.
    pub fn new(name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<Self> {
        let kind = DocumentKind::from_mime(mime_type)?;
        if bytes.is_empty() {
            return Err(StampError::DecodeError(format!("{} is empty", name)));
        }

        Ok(Self {
            id: DocumentId::generate(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            kind,
            bytes,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File-list label, e.g. `"12.34 KB"`
    pub fn size_label(&self) -> String {
        format_size_kb(self.bytes.len())
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            id: self.id,
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            kind: self.kind,
            size_bytes: self.bytes.len(),
            size_label: self.size_label(),
        }
    }
}

/// Kilobytes with two decimals, the way the file list shows sizes
pub fn format_size_kb(bytes: usize) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Serializable summary of a document for list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub name: String,
    pub mime_type: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
    pub size_label: String,
}

/// Documents held for the session, in ingestion order
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
    placements: HashMap<DocumentId, Placement>,
    current: Option<DocumentId>,
    max_file_size: Option<usize>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &StampConfig) -> Self {
        Self {
            max_file_size: Some(config.max_file_size),
            ..Self::default()
        }
    }

    /// Add a file to the session. The first document added to an empty set
    /// becomes current.
    pub fn ingest(&mut self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<DocumentId> {
        if let Some(limit) = self.max_file_size {
            if bytes.len() > limit {
                return Err(StampError::FileTooLarge {
                    size: bytes.len(),
                    limit,
                });
            }
        }

        let document = Document::new(name, mime_type, bytes)?;
        let id = document.id();
        tracing::debug!(%id, name, mime_type, size = document.len(), "document ingested");

        self.documents.push(document);
        if self.current.is_none() {
            self.current = Some(id);
        }
        Ok(id)
    }

    pub fn get(&self, id: DocumentId) -> Result<&Document> {
        self.documents
            .iter()
            .find(|d| d.id() == id)
            .ok_or(StampError::UnknownDocument(id))
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.iter().any(|d| d.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn infos(&self) -> Vec<DocumentInfo> {
        self.documents.iter().map(Document::info).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Evict one document along with its overlay
    pub fn remove(&mut self, id: DocumentId) -> Result<Document> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id() == id)
            .ok_or(StampError::UnknownDocument(id))?;

        self.placements.remove(&id);
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(self.documents.remove(index))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.placements.clear();
        self.current = None;
    }

    pub fn select(&mut self, id: DocumentId) -> Result<()> {
        self.ensure_known(id)?;
        self.current = Some(id);
        Ok(())
    }

    pub fn current(&self) -> Option<&Document> {
        self.current.and_then(|id| self.get(id).ok())
    }

    pub fn current_id(&self) -> Option<DocumentId> {
        self.current
    }

    /// Set or replace the document's overlay placement
    pub fn place(&mut self, id: DocumentId, placement: Placement) -> Result<()> {
        self.ensure_known(id)?;
        self.placements.insert(id, placement);
        Ok(())
    }

    pub fn placement(&self, id: DocumentId) -> Result<Option<&Placement>> {
        self.ensure_known(id)?;
        Ok(self.placements.get(&id))
    }

    /// Apply a drag/resize to an existing overlay. The result is kept inside
    /// the preview it was placed against. Returns the updated placement, or
    /// `None` if the document has no overlay yet.
    pub fn update_overlay<F>(&mut self, id: DocumentId, f: F) -> Result<Option<Placement>>
    where
        F: FnOnce(&OverlayRect) -> OverlayRect,
    {
        self.ensure_known(id)?;
        Ok(self.placements.get_mut(&id).map(|placement| {
            let overlay = f(&placement.overlay).clamp_within(placement.preview);
            *placement = placement.with_overlay(overlay);
            *placement
        }))
    }

    /// The preview was re-rendered at `preview`: carry the overlay over so it
    /// covers the same part of the document.
    pub fn rescale_preview(&mut self, id: DocumentId, preview: Size) -> Result<Option<Placement>> {
        self.ensure_known(id)?;
        let Some(placement) = self.placements.get_mut(&id) else {
            return Ok(None);
        };
        let overlay = placement.overlay.rescale(placement.preview, preview)?;
        *placement = Placement::new(overlay, preview);
        Ok(Some(*placement))
    }

    /// Drop the document's overlay; the document stays in the set
    pub fn dismiss(&mut self, id: DocumentId) -> Result<Option<Placement>> {
        self.ensure_known(id)?;
        Ok(self.placements.remove(&id))
    }

    /// Export one document with the given signature and its own placement
    pub fn export(
        &self,
        id: DocumentId,
        signature: Option<&SignatureImage>,
        config: &StampConfig,
    ) -> Result<ExportResult> {
        let document = self.get(id)?;
        export_document(document, signature, self.placements.get(&id), config)
    }

    fn ensure_known(&self, id: DocumentId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(StampError::UnknownDocument(id))
        }
    }
}
