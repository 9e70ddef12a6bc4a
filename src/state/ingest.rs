/// Image ingestion
///
/// Reads a user-supplied file (picked or dropped) and turns it into an
/// `EncodedImage`. Every entry point goes through `read_file` + `ingest`
/// so the picker and drag-and-drop can never validate differently.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, info};

use super::data::EncodedImage;

/// Declared type used when neither the extension nor the content say otherwise
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum IngestError {
    /// The declared type is not an `image/*` subtype
    #[error("请上传有效的图片文件。")]
    InvalidInputKind { declared_type: String },

    /// The file could not be read from disk
    #[error("无法读取文件：{0}")]
    Read(#[from] std::io::Error),
}

/// A file read from disk, not yet validated
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub declared_type: String,
}

/// Which session slot a loaded file is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Source,
    Reference,
}

/// Validate a file's declared type and wrap its bytes
///
/// Only the declared type is checked; the bytes are passed on as-is and
/// decoded later by the preview widget and the model service.
pub fn ingest(bytes: Vec<u8>, declared_type: &str) -> Result<EncodedImage, IngestError> {
    if !declared_type.starts_with("image/") {
        return Err(IngestError::InvalidInputKind {
            declared_type: declared_type.to_string(),
        });
    }

    Ok(EncodedImage::new(bytes, declared_type))
}

/// Read a file from disk without blocking the UI thread
///
/// The declared type comes from the file extension first (what a browser
/// would report), then from sniffing the content.
pub async fn read_file(path: PathBuf) -> Result<LoadedFile, IngestError> {
    let bytes = tokio::fs::read(&path).await?;

    let declared_type = declared_type_for(&path, &bytes);
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    info!(file = %name, declared_type = %declared_type, len = bytes.len(), "read file");

    Ok(LoadedFile {
        name,
        bytes,
        declared_type,
    })
}

/// Work out the media type a file claims to be
pub fn declared_type_for(path: &Path, bytes: &[u8]) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    // An extension that names no image format is taken at its word
    if path.extension().is_some() {
        return UNKNOWN_MIME_TYPE.to_string();
    }

    // No extension at all: fall back to the magic bytes
    match image::guess_format(bytes) {
        Ok(format) => {
            debug!(path = %path.display(), "declared type sniffed from content");
            format.to_mime_type().to_string()
        }
        Err(_) => UNKNOWN_MIME_TYPE.to_string(),
    }
}
