use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use papertag_core::{Config, ERR_NO_TEXT, ExtractionResult, display_name};
use papertag_parsing::{KeywordExtractor, KeywordSynthesizer, ParsingConfigBuilder, StrategyKind};

/// Runs the whole pipeline on one document: text extraction, then the
/// keywords section, then title/abstract synthesis.
///
/// Holds no per-document state, so one instance can be shared by every
/// worker behind an `Arc`.
#[derive(Debug)]
pub struct DocumentProcessor {
    text: crate::TextExtractor,
    keywords: KeywordExtractor,
    max_pages: usize,
}

impl DocumentProcessor {
    pub fn new(text: crate::TextExtractor, keywords: KeywordExtractor, max_pages: usize) -> Self {
        Self {
            text,
            keywords,
            max_pages,
        }
    }

    /// Build the default backend chain and heuristics from a runtime config.
    ///
    /// Starts the configured annotator; if it cannot start, synthesis uses
    /// word frequency.
    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        let parsing = ParsingConfigBuilder::new()
            .min_section_terms(config.min_section_terms)
            .build()?;
        let synthesizer =
            KeywordSynthesizer::detect(&parsing, config.active_annotator(), config.tool_timeout());
        Ok(Self::new(
            crate::TextExtractor::from_config(config),
            KeywordExtractor::with_config(parsing, synthesizer),
            config.max_pages,
        ))
    }

    pub fn text_extractor(&self) -> &crate::TextExtractor {
        &self.text
    }

    pub fn keyword_extractor(&self) -> &KeywordExtractor {
        &self.keywords
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn strategy(&self) -> StrategyKind {
        self.keywords.strategy()
    }

    /// Extract up to `max_keywords` keywords from the PDF at `path`.
    ///
    /// Never fails: every problem, including a panic inside a backend or a
    /// strategy, comes back as a failed [`ExtractionResult`].
    pub fn process_document(&self, path: &Path, max_keywords: usize) -> ExtractionResult {
        let file_name = display_name(path);
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(path, &file_name, max_keywords))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(path = %path.display(), error = %message, "pipeline panicked");
                ExtractionResult::failure(file_name, format!("Internal error: {}", message))
            }
        }
    }

    fn run(&self, path: &Path, file_name: &str, max_keywords: usize) -> ExtractionResult {
        let Some(text) = self.text.extract_text(path, self.max_pages) else {
            tracing::info!(path = %path.display(), "no text extracted");
            return ExtractionResult::failure(file_name, ERR_NO_TEXT);
        };

        match self.keywords.extract_from_text(&text, max_keywords) {
            Ok(set) => {
                tracing::info!(
                    path = %path.display(),
                    method = %set.method,
                    count = set.keywords.len(),
                    "keywords extracted"
                );
                ExtractionResult::success(file_name, set.method, set.keywords)
            }
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "no keywords");
                ExtractionResult::failure(file_name, e.to_string())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
