//! Image input handling
//!
//! Loads user-supplied images into memory and encodes them as base64 for
//! inline embedding in completion requests.

pub mod encoder;

pub use encoder::{decode, encode, encode_file, strip_data_url_prefix};

use crate::ai::mime::{detect_image_mime, mime_from_extension};
use crate::{Error, Result};
use std::path::Path;

/// Raw bytes of one user image plus its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Payload whose MIME type is sniffed from the bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = detect_image_mime(&bytes);
        Self::new(bytes, mime)
    }

    /// Read an image file fully into memory.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(Error::InvalidRequest(format!(
                "image file {} is empty",
                path.display()
            )));
        }

        let mime = mime_from_extension(path).unwrap_or_else(|| detect_image_mime(&bytes));
        tracing::debug!(
            "Read image {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime
        );
        Ok(Self::new(bytes, mime))
    }

    /// `data:<mime>;base64,<payload>` reference for inline request parts.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, encode(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn test_read_uses_extension_mime() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&PNG_HEADER).unwrap();

        let payload = ImagePayload::read(file.path()).await.unwrap();
        assert_eq!(payload.bytes, PNG_HEADER.to_vec());
        assert_eq!(payload.mime, "image/jpeg");
    }

    #[tokio::test]
    async fn test_read_sniffs_mime_without_extension() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&PNG_HEADER).unwrap();

        let payload = ImagePayload::read(file.path()).await.unwrap();
        assert_eq!(payload.mime, "image/png");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImagePayload::read(dir.path().join("missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[tokio::test]
    async fn test_read_empty_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ImagePayload::read(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_data_url_format() {
        let payload = ImagePayload::new(b"abc".to_vec(), "image/jpeg");
        assert_eq!(payload.to_data_url(), "data:image/jpeg;base64,YWJj");
    }
}
