use std::path::Path;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("extraction tool not found: {0}")]
    ToolMissing(String),
    #[error("extraction tool timed out after {0:?}")]
    Timeout(Duration),
    #[error("extraction tool failed: {0}")]
    ToolFailed(String),
    #[error("extraction produced no text")]
    EmptyOutput,
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Whether the failure came from the tool itself being unusable
    /// (missing binary, timeout) rather than from the document.
    pub fn is_tool_unavailable(&self) -> bool {
        matches!(self, Self::ToolMissing(_) | Self::Timeout(_))
    }
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level text extraction step for the leading
/// pages of a document; the keyword pipeline (keywords section, title/abstract
/// segmentation, synthesis) lives in `papertag_parsing::KeywordExtractor`.
pub trait PdfBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract the text of the first `max_pages` pages of a PDF file.
    fn extract_text(&self, path: &Path, max_pages: usize) -> Result<String, BackendError>;
}
