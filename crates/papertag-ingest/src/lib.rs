use std::path::Path;

pub mod extract;
pub mod pdftotext;
pub mod pool;
pub mod processor;

pub use extract::TextExtractor;
pub use pdftotext::PdftotextBackend;
pub use pool::{BatchPool, DocJob, ProgressFn, process_batch};
pub use processor::DocumentProcessor;

// Re-export domain types for convenience
pub use papertag_core::{Config, ExtractionMethod, ExtractionResult, ProgressEvent, RunStats};

/// Extract keywords from one PDF with the default configuration.
///
/// Convenience wrapper around [`DocumentProcessor::process_document`];
/// build a processor once when handling more than a single file.
pub fn process_document(path: &Path, max_keywords: usize) -> ExtractionResult {
    match DocumentProcessor::from_config(&Config::default()) {
        Ok(processor) => processor.process_document(path, max_keywords),
        Err(e) => ExtractionResult::failure(papertag_core::display_name(path), e.to_string()),
    }
}
