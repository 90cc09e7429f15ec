use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' is not a supported image ({mime_type})", .path.display())]
    UnsupportedType { path: PathBuf, mime_type: String },
    #[error("image '{}' is empty", .path.display())]
    Empty { path: PathBuf },
}

/// A local image prepared for the `imageBase64` request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data_url: String,
    pub mime_type: String,
    pub preview: String,
    pub size_bytes: usize,
}

impl EncodedImage {
    pub async fn from_path(path: &Path) -> Result<Self, ImageError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, &bytes)
    }

    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, ImageError> {
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !mime_type.starts_with("image/") {
            return Err(ImageError::UnsupportedType {
                path: path.to_path_buf(),
                mime_type,
            });
        }
        if bytes.is_empty() {
            return Err(ImageError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            data_url: format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)),
            mime_type,
            preview: path.display().to_string(),
            size_bytes: bytes.len(),
        })
    }
}
