//! Signature slot backed by `window.localStorage`

use sigstamp_core::{Result, SignatureSlot, StampError};
use wasm_bindgen::JsValue;

/// One localStorage key holding the signature data URL
#[derive(Debug, Clone)]
pub struct LocalStorageSlot {
    key: String,
}

impl LocalStorageSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Fails when the page has no usable localStorage (private mode, sandboxed iframe)
    pub fn ensure_available(&self) -> Result<()> {
        storage().map(|_| ())
    }
}

impl SignatureSlot for LocalStorageSlot {
    fn load(&self) -> Result<Option<String>> {
        storage()?.get_item(&self.key).map_err(storage_error)
    }

    fn store(&self, value: &str) -> Result<()> {
        storage()?.set_item(&self.key, value).map_err(storage_error)
    }

    fn remove(&self) -> Result<()> {
        storage()?.remove_item(&self.key).map_err(storage_error)
    }
}

fn storage() -> Result<web_sys::Storage> {
    let window =
        web_sys::window().ok_or_else(|| StampError::Storage("No window".to_string()))?;
    window
        .local_storage()
        .map_err(storage_error)?
        .ok_or_else(|| StampError::Storage("No localStorage".to_string()))
}

fn storage_error(e: JsValue) -> StampError {
    StampError::Storage(crate::js_error_message(&e))
}
