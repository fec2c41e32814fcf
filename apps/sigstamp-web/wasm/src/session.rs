//! Stateful stamping session
//!
//! Holds the dropped documents, their overlays and the saved signature in
//! Rust. JavaScript only forwards DOM events (drop, drag stop, resize stop)
//! and renders what the session reports back.

use js_sys::Uint8Array;
use serde::Serialize;
use sigstamp_core::{
    parse_length, DocumentId, DocumentInfo, DocumentSet, ExportResult, MemorySlot, OverlayRect,
    Placement, Result, SaveTarget, SignatureImage, SignatureSlot, SignatureStore, Size,
    StampConfig, StampError,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::download::BrowserDownload;
use crate::storage::LocalStorageSlot;
use crate::to_js;

/// Session state shared by the JS-facing methods
#[wasm_bindgen]
pub struct StampSession {
    config: StampConfig,
    documents: DocumentSet,
    signature: SignatureStore<Box<dyn SignatureSlot>>,
}

#[wasm_bindgen]
impl StampSession {
    /// Create a session with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> std::result::Result<StampSession, JsValue> {
        Self::create(StampConfig::default())
    }

    /// Create a session from a TOML settings string
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(toml: &str) -> std::result::Result<StampSession, JsValue> {
        let config = StampConfig::from_toml_str(toml).map_err(to_js)?;
        Self::create(config)
    }

    /// Read a dropped `File` and add it to the session
    #[wasm_bindgen(js_name = addFile)]
    pub async fn add_file(&mut self, file: web_sys::File) -> std::result::Result<JsValue, JsValue> {
        let name = file.name();
        let mime_type = file.type_();
        let buffer = JsFuture::from(file.array_buffer()).await?;
        let bytes = Uint8Array::new(&buffer).to_vec();

        let info = self
            .add_document_internal(&name, &mime_type, bytes)
            .map_err(to_js)?;
        to_js_value(&info)
    }

    /// Add a document from raw bytes. Returns its info (including the new id).
    #[wasm_bindgen(js_name = addDocument)]
    pub fn add_document(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> std::result::Result<JsValue, JsValue> {
        let info = self
            .add_document_internal(name, mime_type, bytes.to_vec())
            .map_err(to_js)?;
        to_js_value(&info)
    }

    #[wasm_bindgen(js_name = removeDocument)]
    pub fn remove_document(&mut self, id: &str) -> std::result::Result<(), JsValue> {
        self.remove_document_internal(id).map_err(to_js)
    }

    /// Drop every document, overlay and the selection
    #[wasm_bindgen(js_name = clearDocuments)]
    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }

    #[wasm_bindgen(js_name = selectDocument)]
    pub fn select_document(&mut self, id: &str) -> std::result::Result<(), JsValue> {
        self.documents
            .select(DocumentId::parse(id).map_err(to_js)?)
            .map_err(to_js)
    }

    /// Info for the selected document, or `null`
    #[wasm_bindgen(js_name = currentDocument)]
    pub fn current_document(&self) -> std::result::Result<JsValue, JsValue> {
        match self.documents.current() {
            Some(doc) => to_js_value(&doc.info()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Info for every document, in the order they were added
    #[wasm_bindgen(js_name = documentInfos)]
    pub fn document_infos(&self) -> std::result::Result<JsValue, JsValue> {
        to_js_value(&self.documents.infos())
    }

    /// Persist a signature captured as a PNG data URL
    #[wasm_bindgen(js_name = saveSignature)]
    pub fn save_signature(&mut self, data_url: &str) -> std::result::Result<(), JsValue> {
        self.save_signature_internal(data_url).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearSignature)]
    pub fn clear_signature(&mut self) -> std::result::Result<(), JsValue> {
        self.signature.clear().map_err(to_js)
    }

    /// Data URL for redrawing the saved signature, if there is one
    #[wasm_bindgen(js_name = signatureDataUrl)]
    pub fn signature_data_url(&self) -> Option<String> {
        self.signature.get().map(SignatureImage::to_data_url)
    }

    #[wasm_bindgen(js_name = hasSignature)]
    pub fn has_signature(&self) -> bool {
        self.signature.is_set()
    }

    /// Place an overlay against a preview of the given rendered size
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = placeOverlay)]
    pub fn place_overlay(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        preview_width: f64,
        preview_height: f64,
    ) -> std::result::Result<JsValue, JsValue> {
        let placement = self
            .place_overlay_internal(
                id,
                OverlayRect::new(x, y, width, height),
                Size::new(preview_width, preview_height),
            )
            .map_err(to_js)?;
        to_js_value(&placement)
    }

    /// Place the default-sized overlay at the preview's top-left corner
    #[wasm_bindgen(js_name = placeDefaultOverlay)]
    pub fn place_default_overlay(
        &mut self,
        id: &str,
        preview_width: f64,
        preview_height: f64,
    ) -> std::result::Result<JsValue, JsValue> {
        let placement = self
            .place_overlay_internal(
                id,
                OverlayRect::default_for(&self.config),
                Size::new(preview_width, preview_height),
            )
            .map_err(to_js)?;
        to_js_value(&placement)
    }

    /// Apply a drag-stop position
    #[wasm_bindgen(js_name = dragOverlay)]
    pub fn drag_overlay(&mut self, id: &str, x: f64, y: f64) -> std::result::Result<JsValue, JsValue> {
        let placement = self.drag_overlay_internal(id, x, y).map_err(to_js)?;
        to_js_value(&placement)
    }

    /// Apply a resize-stop result; width and height are styled lengths like `"250px"`
    #[wasm_bindgen(js_name = resizeOverlay)]
    pub fn resize_overlay(
        &mut self,
        id: &str,
        width: &str,
        height: &str,
        x: f64,
        y: f64,
    ) -> std::result::Result<JsValue, JsValue> {
        let placement = self
            .resize_overlay_internal(id, width, height, x, y)
            .map_err(to_js)?;
        to_js_value(&placement)
    }

    /// The preview was re-rendered (window resize, zoom); move the overlay
    /// so it covers the same part of the document.
    #[wasm_bindgen(js_name = rescaleOverlay)]
    pub fn rescale_overlay(
        &mut self,
        id: &str,
        preview_width: f64,
        preview_height: f64,
    ) -> std::result::Result<JsValue, JsValue> {
        let placement = self
            .rescale_overlay_internal(id, Size::new(preview_width, preview_height))
            .map_err(to_js)?;
        to_js_value(&placement)
    }

    #[wasm_bindgen(js_name = dismissOverlay)]
    pub fn dismiss_overlay(&mut self, id: &str) -> std::result::Result<(), JsValue> {
        let id = DocumentId::parse(id).map_err(to_js)?;
        self.documents.dismiss(id).map(|_| ()).map_err(to_js)
    }

    /// The document's current placement, or `null`
    pub fn overlay(&self, id: &str) -> std::result::Result<JsValue, JsValue> {
        let id = DocumentId::parse(id).map_err(to_js)?;
        match self.documents.placement(id).map_err(to_js)? {
            Some(placement) => to_js_value(placement),
            None => Ok(JsValue::NULL),
        }
    }

    /// Export the document and offer it as a download
    #[wasm_bindgen(js_name = exportDocument)]
    pub fn export_document(&self, id: &str) -> std::result::Result<(), JsValue> {
        let outcome = self
            .export_internal(id)
            .and_then(|result| BrowserDownload.save(&result));

        outcome.map_err(|e| {
            web_sys::console::error_1(&format!("Export failed: {}", e).into());
            to_js(e)
        })
    }

    /// Export the document and return the bytes without downloading
    #[wasm_bindgen(js_name = exportBytes)]
    pub fn export_bytes(&self, id: &str) -> std::result::Result<Uint8Array, JsValue> {
        let result = self.export_internal(id).map_err(to_js)?;
        Ok(Uint8Array::from(result.bytes.as_slice()))
    }
}

impl StampSession {
    fn create(config: StampConfig) -> std::result::Result<StampSession, JsValue> {
        let browser = LocalStorageSlot::new(config.storage_key.clone());
        let slot: Box<dyn SignatureSlot> = match browser.ensure_available() {
            Ok(()) => Box::new(browser),
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("{}; the signature will not survive a reload", e).into(),
                );
                Box::new(MemorySlot::new())
            }
        };
        Self::with_slot(config, slot).map_err(to_js)
    }

    /// Build a session over any signature slot
    pub fn with_slot(config: StampConfig, slot: Box<dyn SignatureSlot>) -> Result<Self> {
        Ok(Self {
            documents: DocumentSet::with_config(&config),
            signature: SignatureStore::open(slot)?,
            config,
        })
    }

    fn add_document_internal(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentInfo> {
        let id = self.documents.ingest(name, mime_type, bytes)?;
        Ok(self.documents.get(id)?.info())
    }

    fn remove_document_internal(&mut self, id: &str) -> Result<()> {
        let id = DocumentId::parse(id)?;
        self.documents.remove(id).map(|_| ())
    }

    fn save_signature_internal(&mut self, data_url: &str) -> Result<()> {
        let image = SignatureImage::from_data_url(data_url)?;
        self.signature.set(image)
    }

    fn place_overlay_internal(
        &mut self,
        id: &str,
        overlay: OverlayRect,
        preview: Size,
    ) -> Result<Placement> {
        let id = DocumentId::parse(id)?;
        let placement = Placement::new(overlay, preview);
        self.documents.place(id, placement)?;
        Ok(placement)
    }

    fn drag_overlay_internal(&mut self, id: &str, x: f64, y: f64) -> Result<Placement> {
        let id = DocumentId::parse(id)?;
        self.documents
            .update_overlay(id, |overlay| overlay.drag_to(x, y))?
            .ok_or_else(|| no_overlay(id))
    }

    fn resize_overlay_internal(
        &mut self,
        id: &str,
        width: &str,
        height: &str,
        x: f64,
        y: f64,
    ) -> Result<Placement> {
        let id = DocumentId::parse(id)?;
        let width = parse_length(width)?;
        let height = parse_length(height)?;
        self.documents
            .update_overlay(id, |overlay| overlay.resize_to(width, height, x, y))?
            .ok_or_else(|| no_overlay(id))
    }

    fn rescale_overlay_internal(&mut self, id: &str, preview: Size) -> Result<Placement> {
        let id = DocumentId::parse(id)?;
        self.documents
            .rescale_preview(id, preview)?
            .ok_or_else(|| no_overlay(id))
    }

    fn export_internal(&self, id: &str) -> Result<ExportResult> {
        let id = DocumentId::parse(id)?;
        self.documents.export(id, self.signature.get(), &self.config)
    }
}

fn no_overlay(id: DocumentId) -> StampError {
    StampError::DegenerateLayout(format!("document {} has no overlay placed", id))
}

fn to_js_value<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
