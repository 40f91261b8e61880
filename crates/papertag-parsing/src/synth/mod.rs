//! Keyword synthesis from title and abstract text.
//!
//! Two interchangeable strategies sit behind [`KeywordSynthesizer::synthesize`]:
//! [`NlpStrategy`] when an annotator is available, and [`FrequencyStrategy`]
//! otherwise. Selection happens at runtime by starting the annotator.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub mod annotator;
pub mod frequency;
pub mod nlp;
pub mod stopwords;

pub use annotator::{Annotation, Annotator, AnnotatorError, CommandAnnotator, Entity, NounChunk, Token};
pub use frequency::FrequencyStrategy;
pub use nlp::NlpStrategy;

use crate::config::ParsingConfig;

/// Which strategy produced (or would produce) a keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Nlp,
    Frequency,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nlp => f.write_str("nlp"),
            Self::Frequency => f.write_str("frequency"),
        }
    }
}

/// A ranking strategy: text blob in, at most `max_keywords` terms out.
pub trait KeywordStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn rank(&self, text: &str, max_keywords: usize) -> Result<Vec<String>, AnnotatorError>;
}

/// A candidate term and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCandidate {
    pub term: String,
    pub frequency: usize,
}

/// Frequency counter that remembers first-seen order, so ties rank stably.
#[derive(Debug, Default)]
pub(crate) struct TermCounter {
    entries: Vec<KeywordCandidate>,
    index: HashMap<String, usize>,
}

impl TermCounter {
    pub(crate) fn add(&mut self, term: &str) {
        match self.index.get(term) {
            Some(&i) => self.entries[i].frequency += 1,
            None => {
                self.index.insert(term.to_string(), self.entries.len());
                self.entries.push(KeywordCandidate {
                    term: term.to_string(),
                    frequency: 1,
                });
            }
        }
    }

    /// The `n` most frequent terms; equal counts keep first-seen order.
    pub(crate) fn most_common(mut self, n: usize) -> Vec<KeywordCandidate> {
        // sort_by is stable
        self.entries.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        self.entries.truncate(n);
        self.entries
    }
}

/// Lower-case a term and join its words with hyphens.
pub fn normalize_term(term: &str) -> String {
    term.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Join title (with a trailing period) and abstract into one blob.
pub fn compose_blob(title: Option<&str>, abstract_text: Option<&str>) -> Option<String> {
    match (title, abstract_text) {
        (None, None) => None,
        (Some(t), None) => Some(format!("{}.", t)),
        (None, Some(a)) => Some(a.to_string()),
        (Some(t), Some(a)) => Some(format!("{}. {}", t, a)),
    }
}

/// Runtime-selected keyword synthesis.
///
/// Strategies are tried in order; the first that ranks successfully wins.
/// The frequency strategy is always last and never fails.
pub struct KeywordSynthesizer {
    strategies: Vec<Box<dyn KeywordStrategy>>,
}

impl fmt::Debug for KeywordSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.strategies.iter().map(|s| s.kind()).collect();
        f.debug_struct("KeywordSynthesizer")
            .field("strategies", &kinds)
            .finish()
    }
}

impl KeywordSynthesizer {
    /// Use `preferred` strategies in order, then frequency ranking.
    pub fn new(config: &ParsingConfig, preferred: Vec<Box<dyn KeywordStrategy>>) -> Self {
        let mut strategies = preferred;
        strategies.push(Box::new(FrequencyStrategy::new(config.stop_words.clone())));
        Self { strategies }
    }

    /// Frequency ranking only.
    pub fn frequency_only(config: &ParsingConfig) -> Self {
        Self::new(config, Vec::new())
    }

    /// NLP ranking through `annotator`, with frequency ranking as fallback.
    pub fn with_annotator(config: &ParsingConfig, annotator: Arc<dyn Annotator>) -> Self {
        let nlp = NlpStrategy::new(annotator, config.domain_stop_words.clone());
        Self::new(config, vec![Box::new(nlp)])
    }

    /// Pick strategies by starting the configured annotator command.
    /// Any failure to start it selects the frequency strategy.
    pub fn detect(config: &ParsingConfig, command: Option<&[String]>, timeout: Duration) -> Self {
        let Some(argv) = command else {
            tracing::debug!("no annotator configured, using frequency strategy");
            return Self::frequency_only(config);
        };
        match CommandAnnotator::spawn(argv.to_vec(), timeout) {
            Ok(annotator) => {
                tracing::info!(command = %argv.join(" "), "NLP annotator available");
                Self::with_annotator(config, Arc::new(annotator))
            }
            Err(e) => {
                tracing::warn!(error = %e, "NLP annotator unavailable, using frequency strategy");
                Self::frequency_only(config)
            }
        }
    }

    /// The preferred strategy.
    pub fn strategy(&self) -> StrategyKind {
        self.strategies
            .first()
            .map_or(StrategyKind::Frequency, |s| s.kind())
    }

    /// Derive up to `max_keywords` keywords from title and abstract.
    /// Returns an empty list when both are absent.
    pub fn synthesize(
        &self,
        title: Option<&str>,
        abstract_text: Option<&str>,
        max_keywords: usize,
    ) -> Vec<String> {
        let Some(blob) = compose_blob(title, abstract_text) else {
            return Vec::new();
        };

        for strategy in &self.strategies {
            match strategy.rank(&blob, max_keywords) {
                Ok(keywords) => return keywords,
                Err(e) => {
                    tracing::warn!(strategy = %strategy.kind(), error = %e, "ranking failed, trying next strategy");
                }
            }
        }
        Vec::new()
    }
}
