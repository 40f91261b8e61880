use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{KeywordStrategy, StrategyKind, TermCounter};
use crate::AnnotatorError;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z][a-z]+\b").unwrap());

/// Words of this many characters or fewer are never candidates.
const MAX_SHORT_WORD: usize = 3;

/// Word-frequency ranking over lower-cased alphabetic words.
///
/// Always available; used when no NLP annotator is configured or when an
/// annotation call fails.
#[derive(Debug, Clone)]
pub struct FrequencyStrategy {
    stop_words: HashSet<String>,
}

impl FrequencyStrategy {
    pub fn new(stop_words: HashSet<String>) -> Self {
        Self { stop_words }
    }

    pub fn rank_words(&self, text: &str, max_keywords: usize) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut counter = TermCounter::default();
        for m in WORD_RE.find_iter(&lowered) {
            let word = m.as_str();
            if word.len() <= MAX_SHORT_WORD || self.stop_words.contains(word) {
                continue;
            }
            counter.add(word);
        }
        counter
            .most_common(max_keywords)
            .into_iter()
            .map(|c| c.term)
            .collect()
    }
}

impl KeywordStrategy for FrequencyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Frequency
    }

    fn rank(&self, text: &str, max_keywords: usize) -> Result<Vec<String>, AnnotatorError> {
        Ok(self.rank_words(text, max_keywords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfig;

    fn strategy() -> FrequencyStrategy {
        FrequencyStrategy::new(ParsingConfig::default().stop_words)
    }

    #[test]
    fn test_tied_terms_keep_first_seen_order() {
        let text = "The cell receptor protein binds the receptor protein strongly";
        assert_eq!(strategy().rank_words(text, 2), vec!["receptor", "protein"]);
    }

    #[test]
    fn test_higher_frequency_first() {
        let text = "graph nodes graph edges graph nodes";
        assert_eq!(strategy().rank_words(text, 2), vec!["graph", "nodes"]);
    }

    #[test]
    fn test_short_words_and_stop_words_dropped() {
        let text = "This is how the big dog ran with those cats";
        assert_eq!(strategy().rank_words(text, 5), vec!["cats"]);
    }

    #[test]
    fn test_digits_split_words() {
        // Tokens containing digits are not whole alphabetic words.
        let text = "covid19 genome genome sequencing";
        assert_eq!(
            strategy().rank_words(text, 5),
            vec!["genome", "sequencing"]
        );
    }

    #[test]
    fn test_hyphenated_words_split() {
        let text = "Self-supervised pretraining";
        assert_eq!(
            strategy().rank_words(text, 5),
            vec!["self", "supervised", "pretraining"]
        );
    }

    #[test]
    fn test_uppercase_is_lowered() {
        assert_eq!(strategy().rank_words("LIDAR Lidar lidar", 1), vec!["lidar"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(strategy().rank_words("", 5).is_empty());
    }
}
