use std::path::Path;

use bytes::Bytes;

/// The only document type the backend indexes.
pub const ACCEPTED_CONTENT_TYPE: &str = "application/pdf";
/// Upload ceiling enforced before anything reaches the network (16 MiB).
pub const MAX_DOCUMENT_BYTES: u64 = 16 * 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A document picked by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a PDF file.")]
    NotPdf { content_type: String },
    #[error("File too large. Maximum size is 16MB.")]
    TooLarge { size: u64, max: u64 },
}

impl DocumentFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Builds a document from a file on disk, guessing the content type from
    /// the extension.
    pub fn from_path(path: &Path, bytes: impl Into<Bytes>) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(filename, content_type_for(path), bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Type is checked before size, so a large non-PDF reports the type problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content_type != ACCEPTED_CONTENT_TYPE {
            return Err(ValidationError::NotPdf {
                content_type: self.content_type.clone(),
            });
        }
        let size = self.size();
        if size > MAX_DOCUMENT_BYTES {
            return Err(ValidationError::TooLarge {
                size,
                max: MAX_DOCUMENT_BYTES,
            });
        }
        Ok(())
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => ACCEPTED_CONTENT_TYPE,
        _ => FALLBACK_CONTENT_TYPE,
    }
}
