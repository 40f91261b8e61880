use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use papertag_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`], used as the library
/// fallback when the `pdftotext` tool is missing or fails.
///
/// This crate isolates the mupdf dependency (which is AGPL-3.0) so that the
/// parsing crates do not transitively depend on it.
///
/// Header/footer band exclusion is off by default: the title heuristics
/// need to see running headers in order to skip them.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }
}

fn extraction_error(e: impl std::fmt::Display) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

impl MupdfBackend {
    /// Text of one page, block by block, skipping blocks that lie entirely
    /// inside an excluded header or footer band.
    fn page_text(&self, page: &Page) -> Result<String, BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(extraction_error)?;
        let bounds = page.bounds().map_err(extraction_error)?;
        let height = bounds.y1 - bounds.y0;

        let header_limit = self.header_exclusion_ratio.map(|r| bounds.y0 + height * r);
        let footer_limit = self.footer_exclusion_ratio.map(|r| bounds.y1 - height * r);

        let mut text = String::new();
        for block in text_page.blocks() {
            let rect = block.bounds();
            let in_header = header_limit.is_some_and(|limit| rect.y1 <= limit);
            let in_footer = footer_limit.is_some_and(|limit| rect.y0 >= limit);
            if in_header || in_footer {
                continue;
            }

            for line in block.lines() {
                text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                text.push('\n');
            }
            // Blank line between blocks so paragraph breaks survive.
            text.push('\n');
        }
        Ok(text)
    }
}

impl PdfBackend for MupdfBackend {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn extract_text(&self, path: &Path, max_pages: usize) -> Result<String, BackendError> {
        if !path.is_file() {
            return Err(BackendError::OpenError(format!(
                "no such file: {}",
                path.display()
            )));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages = Vec::new();
        for page in document.pages().map_err(extraction_error)?.take(max_pages) {
            pages.push(self.page_text(&page.map_err(extraction_error)?)?);
        }
        Ok(pages.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_open_error() {
        let backend = MupdfBackend::new();
        let err = backend
            .extract_text(Path::new("/nonexistent/paper.pdf"), 2)
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }

    #[test]
    fn exclusion_ratios_toggle() {
        let backend = MupdfBackend::new()
            .with_header_exclusion(0.04)
            .with_footer_exclusion(0.0);
        assert_eq!(backend.header_exclusion_ratio, Some(0.04));
        assert_eq!(backend.footer_exclusion_ratio, None);
    }
}
