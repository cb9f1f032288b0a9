//! Content kind classification.

use serde::{Deserialize, Serialize};

/// Closed classification of file content, decided once at ingestion from
/// the source content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Any `image/*` content.
    Image,
    /// PDF documents.
    Pdf,
    /// Everything else.
    Document,
}

impl ContentKind {
    /// Classify a MIME type.
    pub fn from_mime_type(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.contains("image") {
            Self::Image
        } else if mime.contains("pdf") {
            Self::Pdf
        } else {
            Self::Document
        }
    }

    /// Whether the content can be shown in the inline previewer.
    pub fn is_previewable(self) -> bool {
        matches!(self, Self::Image | Self::Pdf)
    }
}
