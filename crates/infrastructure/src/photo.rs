//! Loading photos from disk for upload.

use std::path::{Path, PathBuf};

use petmanager_domain::Photo;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a photo.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// The file could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not an image.
    #[error("{path} is not an image ({content_type})")]
    NotAnImage {
        /// Offending file.
        path: PathBuf,
        /// MIME type guessed from the extension.
        content_type: String,
    },
}

/// Reads an image file, guessing its MIME type from the extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an image.
pub async fn load_photo(path: &Path) -> Result<Photo, PhotoError> {
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    if !content_type.starts_with("image/") {
        return Err(PhotoError::NotAnImage {
            path: path.to_path_buf(),
            content_type,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| PhotoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "foto".to_string(), |name| name.to_string_lossy().into_owned());

    debug!(file = %file_name, content_type = %content_type, len = bytes.len(), "photo loaded");
    Ok(Photo::new(file_name, content_type, bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_jpeg() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rex.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let photo = load_photo(&path).await.unwrap();

        assert_eq!(photo.file_name, "rex.jpg");
        assert_eq!(photo.content_type, "image/jpeg");
        assert_eq!(photo.bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn test_rejects_non_images() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(matches!(
            load_photo(&path).await,
            Err(PhotoError::NotAnImage { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            load_photo(&temp.path().join("gone.png")).await,
            Err(PhotoError::Io { .. })
        ));
    }
}
