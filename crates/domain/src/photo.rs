//! Photo attachments for pets and tutors.

use std::fmt;

use crate::request::MultipartFile;

/// Multipart field name the photo endpoints expect.
pub const PHOTO_FIELD: &str = "foto";

/// An image chosen for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    /// Original file name.
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    /// Image bytes.
    pub bytes: Vec<u8>,
}

impl Photo {
    /// Creates a photo.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Converts the photo into the multipart part sent to the API.
    #[must_use]
    pub fn into_multipart(self) -> MultipartFile {
        MultipartFile::new(PHOTO_FIELD, self.file_name, self.content_type, self.bytes)
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
