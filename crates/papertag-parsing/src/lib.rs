use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod keywords;
pub mod matcher;
pub mod segment;
pub mod synth;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::{KeywordExtractor, KeywordSet};
pub use keywords::find_keywords_section;
pub use matcher::PatternMatcher;
pub use segment::{Segments, extract_abstract, extract_title, segment};
pub use synth::{
    Annotation, Annotator, AnnotatorError, CommandAnnotator, KeywordStrategy, KeywordSynthesizer,
    StrategyKind,
};
// Re-export domain types from core (canonical definitions live there)
pub use papertag_core::{ExtractionMethod, ExtractionResult};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Could not extract sufficient keywords")]
    InsufficientKeywords,
}

/// Extract keywords from a document's text with the default configuration.
///
/// Pipeline:
/// 1. Look for an explicit keywords section ("Keywords:", "Key words:",
///    "Index Terms—") with at least three terms
/// 2. Otherwise isolate the title and abstract
/// 3. Synthesize keywords from them by word frequency
pub fn extract_keywords_from_text(
    text: &str,
    max_keywords: usize,
) -> Result<KeywordSet, ParsingError> {
    KeywordExtractor::new().extract_from_text(text, max_keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_message_matches_core_constant() {
        assert_eq!(
            ParsingError::InsufficientKeywords.to_string(),
            papertag_core::ERR_INSUFFICIENT
        );
    }
}
