use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matcher::PatternMatcher;
use crate::synth::stopwords;
use crate::{keywords, segment};

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the keyword extraction heuristics.
///
/// Patterns are stored already compiled into [`PatternMatcher`]s.
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── keywords.rs ──
    /// Header matchers tried in order ("keywords", "key words", "index terms").
    pub(crate) keyword_matchers: Vec<PatternMatcher>,
    /// Delimiters between terms of a keywords section.
    pub(crate) keyword_split_re: Regex,
    /// Terms must be strictly longer than this many characters.
    pub(crate) min_term_chars: usize,
    /// Terms must be strictly shorter than this many characters.
    pub(crate) max_term_chars: usize,
    /// Minimum number of terms before a keywords section is accepted.
    pub(crate) min_section_terms: usize,

    // ── segment.rs ──
    pub(crate) title_scan_lines: usize,
    pub(crate) title_min_chars: usize,
    pub(crate) title_max_chars: usize,
    /// Lines after the first must be strictly longer than this to extend the title.
    pub(crate) title_extend_chars: usize,
    /// Running headers and publication metadata skipped during title search.
    pub(crate) header_noise_re: Regex,
    pub(crate) abstract_matchers: Vec<PatternMatcher>,
    pub(crate) max_abstract_chars: usize,

    // ── synth ──
    /// Generic terms dropped from NLP candidates.
    pub(crate) domain_stop_words: HashSet<String>,
    /// English function/academic words dropped by the frequency strategy.
    pub(crate) stop_words: HashSet<String>,
}

pub(crate) static DEFAULT_CONFIG: Lazy<ParsingConfig> = Lazy::new(ParsingConfig::default);

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            keyword_matchers: keywords::default_matchers(),
            keyword_split_re: keywords::default_split_re(),
            min_term_chars: 2,
            max_term_chars: 50,
            min_section_terms: 3,
            title_scan_lines: 10,
            title_min_chars: 10,
            title_max_chars: 200,
            title_extend_chars: 20,
            header_noise_re: segment::default_header_noise_re(),
            abstract_matchers: segment::default_abstract_matchers(),
            max_abstract_chars: 2000,
            domain_stop_words: to_set(stopwords::DOMAIN_STOP_WORDS.iter().copied()),
            stop_words: to_set(stopwords::ENGLISH_STOP_WORDS.iter().copied()),
        }
    }
}

fn to_set<'a>(words: impl Iterator<Item = &'a str>) -> HashSet<String> {
    words.map(|w| w.to_lowercase()).collect()
}

impl ParsingConfig {
    /// Minimum number of terms for an explicit keywords section to be trusted.
    pub fn min_section_terms(&self) -> usize {
        self.min_section_terms
    }

    pub fn max_abstract_chars(&self) -> usize {
        self.max_abstract_chars
    }

    /// Names of the keyword header matchers, in the order they are tried.
    pub fn keyword_matcher_names(&self) -> Vec<&str> {
        self.keyword_matchers.iter().map(|m| m.name()).collect()
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    keyword_patterns: ListOverride<String>,
    keyword_split_re: Option<String>,
    min_term_chars: Option<usize>,
    max_term_chars: Option<usize>,
    min_section_terms: Option<usize>,
    title_scan_lines: Option<usize>,
    title_min_chars: Option<usize>,
    title_max_chars: Option<usize>,
    title_extend_chars: Option<usize>,
    header_noise_re: Option<String>,
    abstract_patterns: ListOverride<String>,
    max_abstract_chars: Option<usize>,
    domain_stop_words: ListOverride<String>,
    stop_words: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Keywords section ──

    /// Replace the keyword header patterns. Each pattern's first capture
    /// group is the span that gets split into terms.
    pub fn set_keyword_patterns(mut self, patterns: Vec<String>) -> Self {
        self.keyword_patterns = ListOverride::Replace(patterns);
        self
    }

    /// Append a keyword header pattern, tried after the built-in ones.
    pub fn add_keyword_pattern(mut self, pattern: String) -> Self {
        match &mut self.keyword_patterns {
            ListOverride::Extend(v) => v.push(pattern),
            _ => self.keyword_patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    pub fn keyword_split_regex(mut self, pattern: &str) -> Self {
        self.keyword_split_re = Some(pattern.to_string());
        self
    }

    pub fn term_length_bounds(mut self, min_exclusive: usize, max_exclusive: usize) -> Self {
        self.min_term_chars = Some(min_exclusive);
        self.max_term_chars = Some(max_exclusive);
        self
    }

    pub fn min_section_terms(mut self, n: usize) -> Self {
        self.min_section_terms = Some(n);
        self
    }

    // ── Title ──

    pub fn title_scan_lines(mut self, n: usize) -> Self {
        self.title_scan_lines = Some(n);
        self
    }

    pub fn title_length_bounds(mut self, min_exclusive: usize, max_exclusive: usize) -> Self {
        self.title_min_chars = Some(min_exclusive);
        self.title_max_chars = Some(max_exclusive);
        self
    }

    pub fn title_extend_chars(mut self, n: usize) -> Self {
        self.title_extend_chars = Some(n);
        self
    }

    pub fn header_noise_regex(mut self, pattern: &str) -> Self {
        self.header_noise_re = Some(pattern.to_string());
        self
    }

    // ── Abstract ──

    pub fn set_abstract_patterns(mut self, patterns: Vec<String>) -> Self {
        self.abstract_patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_abstract_pattern(mut self, pattern: String) -> Self {
        match &mut self.abstract_patterns {
            ListOverride::Extend(v) => v.push(pattern),
            _ => self.abstract_patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    pub fn max_abstract_chars(mut self, n: usize) -> Self {
        self.max_abstract_chars = Some(n);
        self
    }

    // ── Stop words ──

    pub fn set_stop_words(mut self, words: Vec<String>) -> Self {
        self.stop_words = ListOverride::Replace(words);
        self
    }

    pub fn add_stop_word(mut self, word: String) -> Self {
        match &mut self.stop_words {
            ListOverride::Extend(v) => v.push(word),
            _ => self.stop_words = ListOverride::Extend(vec![word]),
        }
        self
    }

    pub fn add_domain_stop_word(mut self, word: String) -> Self {
        match &mut self.domain_stop_words {
            ListOverride::Extend(v) => v.push(word),
            _ => self.domain_stop_words = ListOverride::Extend(vec![word]),
        }
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let defaults = ParsingConfig::default();

        let compile = |opt: Option<String>, fallback: Regex| -> Result<Regex, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose().map(|r| r.unwrap_or(fallback))
        };

        let compile_matchers = |over: ListOverride<String>,
                                defaults: Vec<PatternMatcher>|
         -> Result<Vec<PatternMatcher>, regex::Error> {
            let custom = |patterns: &[String]| -> Result<Vec<PatternMatcher>, regex::Error> {
                patterns
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        Regex::new(p).map(|re| PatternMatcher::first_group(format!("custom-{}", i + 1), re))
                    })
                    .collect()
            };
            match over {
                ListOverride::Default => Ok(defaults),
                ListOverride::Replace(patterns) => custom(&patterns),
                ListOverride::Extend(patterns) => {
                    let mut result = defaults;
                    result.extend(custom(&patterns)?);
                    Ok(result)
                }
            }
        };

        let resolve_words = |over: ListOverride<String>, defaults: &[&str]| -> HashSet<String> {
            let defaults: Vec<String> = defaults.iter().map(|w| w.to_string()).collect();
            to_set(over.resolve(&defaults).iter().map(String::as_str))
        };

        Ok(ParsingConfig {
            keyword_matchers: compile_matchers(self.keyword_patterns, defaults.keyword_matchers)?,
            keyword_split_re: compile(self.keyword_split_re, defaults.keyword_split_re)?,
            min_term_chars: self.min_term_chars.unwrap_or(defaults.min_term_chars),
            max_term_chars: self.max_term_chars.unwrap_or(defaults.max_term_chars),
            min_section_terms: self.min_section_terms.unwrap_or(defaults.min_section_terms),
            title_scan_lines: self.title_scan_lines.unwrap_or(defaults.title_scan_lines),
            title_min_chars: self.title_min_chars.unwrap_or(defaults.title_min_chars),
            title_max_chars: self.title_max_chars.unwrap_or(defaults.title_max_chars),
            title_extend_chars: self.title_extend_chars.unwrap_or(defaults.title_extend_chars),
            header_noise_re: compile(self.header_noise_re, defaults.header_noise_re)?,
            abstract_matchers: compile_matchers(self.abstract_patterns, defaults.abstract_matchers)?,
            max_abstract_chars: self.max_abstract_chars.unwrap_or(defaults.max_abstract_chars),
            domain_stop_words: resolve_words(self.domain_stop_words, stopwords::DOMAIN_STOP_WORDS),
            stop_words: resolve_words(self.stop_words, stopwords::ENGLISH_STOP_WORDS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.min_section_terms, 3);
        assert_eq!(config.max_abstract_chars, 2000);
        assert_eq!(config.title_scan_lines, 10);
        assert_eq!(
            config.keyword_matcher_names(),
            vec!["keywords", "key-words", "index-terms"]
        );
        assert!(config.domain_stop_words.contains("paper"));
    }

    #[test]
    fn test_builder_basic() {
        let config = ParsingConfigBuilder::new()
            .min_section_terms(2)
            .max_abstract_chars(500)
            .title_length_bounds(5, 100)
            .build()
            .unwrap();
        assert_eq!(config.min_section_terms, 2);
        assert_eq!(config.max_abstract_chars, 500);
        assert_eq!(config.title_min_chars, 5);
        assert_eq!(config.title_max_chars, 100);
    }

    #[test]
    fn test_builder_extends_keyword_patterns() {
        let config = ParsingConfigBuilder::new()
            .add_keyword_pattern(r"(?im)\bschlagw(?:ö|oe)rter\b[ \t]*:?[ \t]*([^\n]+)".into())
            .build()
            .unwrap();
        assert_eq!(
            config.keyword_matcher_names(),
            vec!["keywords", "key-words", "index-terms", "custom-1"]
        );
    }

    #[test]
    fn test_builder_replaces_abstract_patterns() {
        let config = ParsingConfigBuilder::new()
            .set_abstract_patterns(vec![r"(?is)zusammenfassung\s*(.*?)\n\s*\n".into()])
            .build()
            .unwrap();
        assert_eq!(config.abstract_matchers.len(), 1);
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new()
            .header_noise_regex(r"[invalid")
            .build();
        assert!(result.is_err());

        let result = ParsingConfigBuilder::new()
            .add_keyword_pattern(r"(unclosed".into())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_stop_words() {
        let config = ParsingConfigBuilder::new()
            .add_stop_word("Model".into())
            .add_domain_stop_word("dataset".into())
            .build()
            .unwrap();
        assert!(config.stop_words.contains("model"));
        assert!(config.stop_words.contains("the"));
        assert!(config.domain_stop_words.contains("dataset"));

        let config = ParsingConfigBuilder::new()
            .set_stop_words(vec!["only".into()])
            .build()
            .unwrap();
        assert_eq!(config.stop_words.len(), 1);
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
