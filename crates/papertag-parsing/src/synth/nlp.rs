use std::collections::HashSet;
use std::sync::Arc;

use super::annotator::{Annotation, Annotator};
use super::{KeywordStrategy, StrategyKind, TermCounter, normalize_term};
use crate::AnnotatorError;

/// Noun chunks longer than this many tokens are not candidates.
const MAX_CHUNK_TOKENS: usize = 3;
/// Candidate pool is this many times the requested keyword count.
const POOL_FACTOR: usize = 3;

const ENTITY_LABELS: &[&str] = &["ORG", "PRODUCT", "WORK_OF_ART", "EVENT", "GPE"];
const NOUN_TAGS: &[&str] = &["NOUN", "PROPN"];

/// Keyword ranking over noun chunks, named entities and noun lemmas.
pub struct NlpStrategy {
    annotator: Arc<dyn Annotator>,
    domain_stop_words: HashSet<String>,
}

impl NlpStrategy {
    pub fn new(annotator: Arc<dyn Annotator>, domain_stop_words: HashSet<String>) -> Self {
        Self {
            annotator,
            domain_stop_words,
        }
    }

    /// Rank the candidates of an existing annotation.
    pub fn rank_annotation(&self, annotation: &Annotation, max_keywords: usize) -> Vec<String> {
        let mut counter = TermCounter::default();
        for candidate in candidates(annotation) {
            let term = normalize_term(&candidate);
            if term.chars().count() <= 2 || self.domain_stop_words.contains(&term) {
                continue;
            }
            counter.add(&term);
        }

        let mut keywords: Vec<String> = counter
            .most_common(POOL_FACTOR * max_keywords)
            .into_iter()
            .map(|c| c.term)
            .collect();
        keywords.truncate(max_keywords);
        keywords
    }
}

/// Lower-cased candidate pools, in order: short noun chunks, selected
/// entities, then lemmas of non-stop nouns.
fn candidates(annotation: &Annotation) -> Vec<String> {
    let chunks = annotation
        .noun_chunks
        .iter()
        .filter(|c| c.token_count <= MAX_CHUNK_TOKENS)
        .map(|c| c.text.to_lowercase());

    let entities = annotation
        .entities
        .iter()
        .filter(|e| ENTITY_LABELS.contains(&e.label.as_str()))
        .map(|e| e.text.to_lowercase());

    let lemmas = annotation
        .tokens
        .iter()
        .filter(|t| NOUN_TAGS.contains(&t.pos.as_str()))
        .filter(|t| !t.is_stop && t.text.chars().count() > 2)
        .map(|t| t.lemma.to_lowercase());

    chunks.chain(entities).chain(lemmas).collect()
}

impl KeywordStrategy for NlpStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Nlp
    }

    fn rank(&self, text: &str, max_keywords: usize) -> Result<Vec<String>, AnnotatorError> {
        let annotation = self.annotator.annotate(text)?;
        Ok(self.rank_annotation(&annotation, max_keywords))
    }
}
