/// Shared data structures for the editing session
///
/// These structs represent the data model that flows between
/// file ingestion, the session state machine and the edit gateway.

use std::fmt;
use std::sync::Arc;

/// Media type assumed when the model service does not declare one
pub const FALLBACK_MIME_TYPE: &str = "image/png";

/// An encoded image payload (PNG, JPEG, WEBP, ...) plus its media type
///
/// Cloning is cheap: clones share the same payload buffer, so the
/// session can hand the image to the gateway without copying it.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl EncodedImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Raw encoded bytes (not decoded pixels)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared media type, e.g. "image/png"
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when both values point at the very same payload buffer
    pub fn same_payload(&self, other: &EncodedImage) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

// Payloads are megabytes; print the size instead of the bytes
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Everything the gateway needs for one edit call
///
/// Captured from the session at the moment the edit starts, so later
/// session changes cannot leak into a request that is already in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub source: EncodedImage,
    pub reference: Option<EncodedImage>,
    pub instruction: String,
}
