//! Signature image and its single persisted slot
//!
//! The capture widget hands over a PNG data URL. Exactly one signature is
//! active at a time; it survives across sessions in one key-value slot.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, StampError};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Encoding of a signature raster, sniffed from its leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFormat {
    Png,
    Jpeg,
    Other,
}

impl SignatureFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_MAGIC) {
            SignatureFormat::Png
        } else if bytes.starts_with(&JPEG_MAGIC) {
            SignatureFormat::Jpeg
        } else {
            SignatureFormat::Other
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SignatureFormat::Png => "image/png",
            SignatureFormat::Jpeg => "image/jpeg",
            SignatureFormat::Other => "application/octet-stream",
        }
    }
}

/// Encoded raster of the user's ink strokes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    bytes: Vec<u8>,
}

impl SignatureImage {
    /// Wrap encoded image bytes. Decoding is deferred to the compositor that
    /// needs it, which reports its own format requirements.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(StampError::DecodeError(
                "signature image is empty".to_string(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Wrap PNG bytes, checking the signature header
    pub fn from_png(bytes: Vec<u8>) -> Result<Self> {
        if SignatureFormat::sniff(&bytes) != SignatureFormat::Png {
            return Err(StampError::DecodeError(
                "signature is not a PNG image".to_string(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Parse `data:<mime>;base64,<payload>`
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| StampError::DecodeError("signature is not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StampError::DecodeError("data URL has no payload".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(StampError::DecodeError(
                "data URL is not base64-encoded".to_string(),
            ));
        }

        let bytes = B64
            .decode(payload.as_bytes())
            .map_err(|e| StampError::DecodeError(format!("invalid base64 in data URL: {}", e)))?;
        Self::from_bytes(bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format().mime_type(),
            B64.encode(&self.bytes)
        )
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> SignatureFormat {
        SignatureFormat::sniff(&self.bytes)
    }
}

/// One persisted key-value slot holding the encoded signature
pub trait SignatureSlot {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, value: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

impl<T: SignatureSlot + ?Sized> SignatureSlot for Box<T> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn store(&self, value: &str) -> Result<()> {
        (**self).store(value)
    }

    fn remove(&self) -> Result<()> {
        (**self).remove()
    }
}

/// In-process slot, for tests and hosts without persistence
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: RefCell::new(Some(value.into())),
        }
    }
}

impl SignatureSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.value.borrow().clone())
    }

    fn store(&self, value: &str) -> Result<()> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}

/// Slot backed by a single file on disk
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SignatureSlot for FileSlot {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, value)?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The session's current signature, kept in sync with its persisted slot
#[derive(Debug)]
pub struct SignatureStore<S: SignatureSlot> {
    slot: S,
    current: Option<SignatureImage>,
}

impl<S: SignatureSlot> SignatureStore<S> {
    /// Initialize from whatever the slot holds. A persisted value that no
    /// longer parses is dropped with a warning; startup does not fail on it.
    pub fn open(slot: S) -> Result<Self> {
        let current = match slot.load()? {
            Some(value) => match SignatureImage::from_data_url(&value) {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable persisted signature");
                    None
                }
            },
            None => None,
        };

        Ok(Self { slot, current })
    }

    pub fn get(&self) -> Option<&SignatureImage> {
        self.current.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    /// Persist first, then cache, so a storage failure leaves both unchanged
    pub fn set(&mut self, image: SignatureImage) -> Result<()> {
        self.slot.store(&image.to_data_url())?;
        tracing::debug!(bytes = image.as_bytes().len(), "signature saved");
        self.current = Some(image);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.slot.remove()?;
        self.current = None;
        tracing::debug!("signature cleared");
        Ok(())
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tiny_png() -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 1, 1);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 0, 0, 255]).unwrap();
        }
        out
    }

    #[test]
    fn test_data_url_round_trip() {
        let image = SignatureImage::from_png(tiny_png()).unwrap();
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(SignatureImage::from_data_url(&url).unwrap(), image);
    }

    #[test]
    fn test_data_url_rejects_non_base64() {
        let err = SignatureImage::from_data_url("data:image/png,rawpayload").unwrap_err();
        assert!(matches!(err, StampError::DecodeError(_)));
    }

    #[test]
    fn test_data_url_rejects_plain_string() {
        assert!(SignatureImage::from_data_url("iVBORw0KGgo=").is_err());
        assert!(SignatureImage::from_data_url("data:image/png;base64,@@@").is_err());
        assert!(SignatureImage::from_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_from_png_checks_magic() {
        assert!(SignatureImage::from_png(vec![0xFF, 0xD8, 0xFF, 0xE0]).is_err());
    }

    #[test]
    fn test_sniff() {
        assert_eq!(SignatureFormat::sniff(&tiny_png()), SignatureFormat::Png);
        assert_eq!(
            SignatureFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            SignatureFormat::Jpeg
        );
        assert_eq!(SignatureFormat::sniff(b"GIF89a"), SignatureFormat::Other);
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SignatureStore::open(MemorySlot::new()).unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_store_loads_persisted_signature() {
        let image = SignatureImage::from_png(tiny_png()).unwrap();
        let store = SignatureStore::open(MemorySlot::with_value(image.to_data_url())).unwrap();
        assert_eq!(store.get(), Some(&image));
    }

    #[test]
    fn test_store_discards_corrupt_value() {
        let store = SignatureStore::open(MemorySlot::with_value("not a data url")).unwrap();
        assert!(!store.is_set());
    }

    #[test]
    fn test_set_and_clear_persist() {
        let mut store = SignatureStore::open(MemorySlot::new()).unwrap();
        let image = SignatureImage::from_png(tiny_png()).unwrap();

        store.set(image.clone()).unwrap();
        assert_eq!(store.slot().load().unwrap(), Some(image.to_data_url()));
        assert_eq!(store.get(), Some(&image));

        store.clear().unwrap();
        assert_eq!(store.slot().load().unwrap(), None);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_file_slot_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("state").join("signature"));

        assert_eq!(slot.load().unwrap(), None);
        slot.store("data:image/png;base64,AAAA").unwrap();
        assert_eq!(
            slot.load().unwrap().as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        slot.remove().unwrap();
        assert_eq!(slot.load().unwrap(), None);
        // Removing an absent value is fine
        slot.remove().unwrap();
    }

    #[test]
    fn test_store_survives_reopen_with_file_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signature");
        let image = SignatureImage::from_png(tiny_png()).unwrap();

        let mut store = SignatureStore::open(FileSlot::new(&path)).unwrap();
        store.set(image.clone()).unwrap();
        drop(store);

        let reopened = SignatureStore::open(FileSlot::new(&path)).unwrap();
        assert_eq!(reopened.get(), Some(&image));
    }
}
