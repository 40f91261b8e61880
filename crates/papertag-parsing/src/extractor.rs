use papertag_core::ExtractionMethod;

use crate::config::ParsingConfig;
use crate::segment::Segments;
use crate::synth::{KeywordSynthesizer, StrategyKind};
use crate::{ParsingError, keywords, segment};

/// Keywords chosen for a document and how they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    pub method: ExtractionMethod,
    pub keywords: Vec<String>,
}

/// A configurable keyword extraction pipeline over already-extracted text.
///
/// Holds a [`ParsingConfig`] and a [`KeywordSynthesizer`] and exposes each
/// pipeline step as a method. Text extraction from the PDF itself lives in
/// `papertag_ingest`.
#[derive(Debug)]
pub struct KeywordExtractor {
    config: ParsingConfig,
    synthesizer: KeywordSynthesizer,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Default configuration, frequency synthesis only.
    pub fn new() -> Self {
        let config = ParsingConfig::default();
        let synthesizer = KeywordSynthesizer::frequency_only(&config);
        Self {
            config,
            synthesizer,
        }
    }

    pub fn with_config(config: ParsingConfig, synthesizer: KeywordSynthesizer) -> Self {
        Self {
            config,
            synthesizer,
        }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn strategy(&self) -> StrategyKind {
        self.synthesizer.strategy()
    }

    /// Find and split an explicit keywords section (step 1).
    pub fn find_keywords_section(&self, text: &str) -> Option<Vec<String>> {
        keywords::find_keywords_section_with_config(text, &self.config)
    }

    /// Isolate title and abstract (step 2).
    pub fn segment(&self, text: &str) -> Segments {
        segment::segment_with_config(text, &self.config)
    }

    /// Derive keywords from title and abstract (step 3).
    pub fn synthesize(&self, segments: &Segments, max_keywords: usize) -> Vec<String> {
        self.synthesizer.synthesize(
            segments.title.as_deref(),
            segments.abstract_text.as_deref(),
            max_keywords,
        )
    }

    /// Run the pipeline on a document's text: an explicit keywords section
    /// with enough terms wins; otherwise keywords are synthesized from the
    /// title and abstract.
    pub fn extract_from_text(
        &self,
        text: &str,
        max_keywords: usize,
    ) -> Result<KeywordSet, ParsingError> {
        if let Some(mut terms) = self.find_keywords_section(text) {
            if terms.len() >= self.config.min_section_terms {
                terms.truncate(max_keywords);
                if !terms.is_empty() {
                    return Ok(KeywordSet {
                        method: ExtractionMethod::KeywordsSection,
                        keywords: terms,
                    });
                }
            } else {
                tracing::debug!(
                    terms = terms.len(),
                    min = self.config.min_section_terms,
                    "keywords section too short, trying title/abstract"
                );
            }
        }

        let segments = self.segment(text);
        if segments.is_empty() {
            return Err(ParsingError::InsufficientKeywords);
        }

        let keywords = self.synthesize(&segments, max_keywords);
        if keywords.is_empty() {
            return Err(ParsingError::InsufficientKeywords);
        }
        Ok(KeywordSet {
            method: ExtractionMethod::TitleAbstract,
            keywords,
        })
    }
}
