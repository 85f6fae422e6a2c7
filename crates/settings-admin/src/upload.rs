//! Logo upload: turn an image file into a `data:` URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while reading an uploaded logo.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file could not be read.
    #[error("failed to read {}: {}", path.display(), source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The extension does not name a supported image type.
    #[error("{} is not a supported image (png, jpg, gif, svg, webp, ico)", .0.display())]
    UnsupportedImage(PathBuf),
}

/// MIME type for an image path, judged by extension only.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}

/// Encode `bytes` as a base64 data URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read an image file and return it as a data URL. Image content is not
/// inspected.
pub fn logo_data_url(path: impl AsRef<Path>) -> Result<String, UploadError> {
    let path = path.as_ref();
    let mime = image_mime(path).ok_or_else(|| UploadError::UnsupportedImage(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(data_url(mime, &bytes))
}
