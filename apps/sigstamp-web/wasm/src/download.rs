//! Offer an export to the user as a browser download

use js_sys::{Array, Uint8Array};
use sigstamp_core::{ExportResult, Result, SaveTarget, StampError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlElement, Url};

/// Saves by clicking a temporary `<a download>` pointing at an object URL
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownload;

impl SaveTarget for BrowserDownload {
    fn save(&self, result: &ExportResult) -> Result<()> {
        trigger_download(&result.bytes, &result.mime_type, &result.suggested_filename)
            .map_err(|e| StampError::Save(crate::js_error_message(&e)))
    }
}

fn trigger_download(bytes: &[u8], mime_type: &str, filename: &str) -> std::result::Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let body = document.body().ok_or("No body")?;

    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document.create_element("a")?;
    anchor.set_attribute("href", &url)?;
    anchor.set_attribute("download", filename)?;
    anchor.set_attribute("style", "display: none")?;
    body.append_child(&anchor)?;

    let clicked = anchor
        .dyn_ref::<HtmlElement>()
        .ok_or("Anchor is not an HtmlElement")
        .map(|a| a.click());

    // Clean up even if the click could not be dispatched
    body.remove_child(&anchor)?;
    Url::revoke_object_url(&url)?;
    clicked.map_err(JsValue::from)
}
