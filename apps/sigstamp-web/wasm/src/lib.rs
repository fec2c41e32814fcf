//! WASM bindings for signature stamping
//!
//! State lives in Rust in a `StampSession`. JavaScript handles the drop zone,
//! the signature pad canvas and the draggable overlay, and forwards the
//! results here.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { StampSession } from './pkg/sigstamp_wasm.js';
//!
//! await init();
//!
//! const session = new StampSession();
//! const info = await session.addFile(file);
//! session.saveSignature(canvas.toDataURL("image/png"));
//! session.placeDefaultOverlay(info.id, preview.clientWidth, preview.clientHeight);
//! session.dragOverlay(info.id, x, y);
//! session.exportDocument(info.id); // downloads signed_<name>
//! ```

pub mod download;
pub mod session;
pub mod storage;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use download::BrowserDownload;
pub use session::StampSession;
pub use storage::LocalStorageSlot;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"SigStamp WASM initialized".into());
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// File-list size label, e.g. `"12.34 KB"`
#[wasm_bindgen(js_name = formatFileSize)]
pub fn format_file_size(bytes: usize) -> String {
    sigstamp_core::format_size_kb(bytes)
}

/// Where to draw a saved signature of `source` size inside the pad canvas,
/// scaled to fit and centered. Returns `{ x, y, width, height }`.
#[wasm_bindgen(js_name = fitCentered)]
pub fn fit_centered(
    source_width: f64,
    source_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> Result<JsValue, JsValue> {
    let rect = sigstamp_core::fit_centered(
        sigstamp_core::Size::new(source_width, source_height),
        sigstamp_core::Size::new(canvas_width, canvas_height),
    )
    .map_err(to_js)?;

    serde_wasm_bindgen::to_value(&rect)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Convert a core error into a JS `Error` whose `name` is the error kind,
/// so callers can branch on `err.name` and show `err.message`.
pub(crate) fn to_js(e: sigstamp_core::StampError) -> JsValue {
    let err = js_sys::Error::new(&e.to_string());
    err.set_name(e.kind());
    err.into()
}

/// Best-effort text for a thrown JS value
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn file_size_label_round_trips_to_two_decimals(bytes in 0usize..10_000_000) {
            let label = format_file_size(bytes);
            prop_assert!(label.ends_with(" KB"));
            let kb: f64 = label.trim_end_matches(" KB").parse().unwrap();
            prop_assert!((kb - bytes as f64 / 1024.0).abs() <= 0.005 + 1e-9);
        }
    }
}
