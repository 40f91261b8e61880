use std::path::Path;

use papertag_core::{Config, PdfBackend};

use crate::pdftotext::PdftotextBackend;

/// Ordered chain of text backends. The first one to produce non-blank text
/// wins; every failure moves on to the next.
pub struct TextExtractor {
    backends: Vec<Box<dyn PdfBackend>>,
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor")
            .field("backends", &self.backend_names())
            .finish()
    }
}

impl TextExtractor {
    pub fn new(backends: Vec<Box<dyn PdfBackend>>) -> Self {
        Self { backends }
    }

    /// `pdftotext` first, then MuPDF when compiled in.
    pub fn from_config(config: &Config) -> Self {
        let mut backends: Vec<Box<dyn PdfBackend>> = vec![Box::new(PdftotextBackend::new(
            config.pdftotext_path.clone(),
            config.tool_timeout(),
        ))];
        #[cfg(feature = "mupdf")]
        backends.push(Box::new(papertag_pdf_mupdf::MupdfBackend::new()));
        Self::new(backends)
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Text of the first `max_pages` pages, or `None` when no backend
    /// produced any. Never fails.
    pub fn extract_text(&self, path: &Path, max_pages: usize) -> Option<String> {
        for backend in &self.backends {
            match backend.extract_text(path, max_pages) {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(
                        path = %path.display(),
                        backend = backend.name(),
                        chars = text.len(),
                        "text extracted"
                    );
                    return Some(text);
                }
                Ok(_) => {
                    tracing::debug!(path = %path.display(), backend = backend.name(), "blank text");
                }
                Err(e) if e.is_tool_unavailable() => {
                    tracing::warn!(
                        path = %path.display(),
                        backend = backend.name(),
                        error = %e,
                        "backend unavailable, trying next"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        backend = backend.name(),
                        error = %e,
                        "backend failed"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papertag_core::BackendError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        outcome: fn() -> Result<String, BackendError>,
        calls: Arc<AtomicUsize>,
    }

    impl PdfBackend for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn extract_text(&self, _path: &Path, _max_pages: usize) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn scripted(outcome: fn() -> Result<String, BackendError>) -> (Box<dyn PdfBackend>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend: Box<dyn PdfBackend> = Box::new(Scripted {
            outcome,
            calls: calls.clone(),
        });
        (backend, calls)
    }

    #[test]
    fn test_first_success_short_circuits() {
        let (first, first_calls) = scripted(|| Ok("primary text".into()));
        let (second, second_calls) = scripted(|| Ok("secondary text".into()));
        let chain = TextExtractor::new(vec![first, second]);
        assert_eq!(
            chain.extract_text(Path::new("a.pdf"), 2).as_deref(),
            Some("primary text")
        );
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_timeout_falls_back() {
        let (first, _) = scripted(|| Err(BackendError::Timeout(std::time::Duration::from_secs(30))));
        let (second, _) = scripted(|| Ok("fallback text".into()));
        let chain = TextExtractor::new(vec![first, second]);
        assert_eq!(
            chain.extract_text(Path::new("a.pdf"), 2).as_deref(),
            Some("fallback text")
        );
    }

    #[test]
    fn test_blank_text_falls_back() {
        let (first, _) = scripted(|| Ok("   \n\t".into()));
        let (second, _) = scripted(|| Ok("real text".into()));
        let chain = TextExtractor::new(vec![first, second]);
        assert_eq!(
            chain.extract_text(Path::new("a.pdf"), 2).as_deref(),
            Some("real text")
        );
    }

    #[test]
    fn test_all_failures_is_none() {
        let (first, _) = scripted(|| Err(BackendError::ToolMissing("pdftotext".into())));
        let (second, _) = scripted(|| Err(BackendError::OpenError("not a pdf".into())));
        let chain = TextExtractor::new(vec![first, second]);
        assert!(chain.extract_text(Path::new("a.pdf"), 2).is_none());
    }

    #[test]
    fn test_empty_chain_is_none() {
        assert!(TextExtractor::new(Vec::new())
            .extract_text(Path::new("a.pdf"), 2)
            .is_none());
    }

    #[test]
    fn test_default_chain_order() {
        let names = TextExtractor::from_config(&Config::default()).backend_names();
        assert_eq!(names[0], "pdftotext");
        #[cfg(feature = "mupdf")]
        assert_eq!(names, vec!["pdftotext", "mupdf"]);
    }
}
