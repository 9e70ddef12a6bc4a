/// Saving the edited image
///
/// The result is offered under a fixed prefix plus a millisecond timestamp.
/// The extension is always `.png`, whatever media type the model returned.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::state::EncodedImage;

const FILE_PREFIX: &str = "magic-lens-edit-";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("没有可下载的结果。")]
    NoResult,

    #[error("保存失败：{0}")]
    Write(#[from] std::io::Error),
}

/// Suggested file name for a download made at `now`
pub fn download_file_name(now: DateTime<Utc>) -> String {
    format!("{}{}.png", FILE_PREFIX, now.timestamp_millis())
}

/// Ask the user where to put the result
///
/// Returns `None` when the dialog is cancelled.
pub fn pick_destination(start_dir: Option<&Path>, now: DateTime<Utc>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("保存结果")
        .set_file_name(download_file_name(now))
        .add_filter("PNG", &["png"]);

    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.save_file()
}

/// Write the result bytes as-is to `destination`
pub async fn save_result(
    image: Option<EncodedImage>,
    destination: PathBuf,
) -> Result<PathBuf, ExportError> {
    let image = image.ok_or(ExportError::NoResult)?;

    tokio::fs::write(&destination, image.bytes()).await?;

    info!(
        path = %destination.display(),
        mime_type = image.mime_type(),
        len = image.len(),
        "saved result"
    );
    Ok(destination)
}
