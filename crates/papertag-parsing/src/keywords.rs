use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{DEFAULT_CONFIG, ParsingConfig};
use crate::matcher::{PatternMatcher, first_accepted};

// Header, optional colon/dash, rest of the line, then at most one short
// continuation line (≤ 80 chars). The rest of the line may be empty, so a
// separator is never captured as part of the first term.
static KEYWORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\bkeywords?\b[ \t]*(?:[:\-\u{2013}\u{2014}][ \t]*)?([^\n]*(?:\n[^\n]{0,80}$)?)")
        .unwrap()
});
static KEY_WORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\bkey[ \t]+words\b[ \t]*(?:[:\-\u{2013}\u{2014}][ \t]*)?([^\n]*(?:\n[^\n]{0,80}$)?)")
        .unwrap()
});
static INDEX_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\bindex[ \t]+terms\b[ \t]*(?:[:\-\u{2013}\u{2014}][ \t]*)?([^\n]*(?:\n[^\n]{0,80}$)?)")
        .unwrap()
});

static SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;,\u{00B7}\u{2022}]|\band\b").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub(crate) fn default_matchers() -> Vec<PatternMatcher> {
    vec![
        PatternMatcher::first_group("keywords", KEYWORDS_RE.clone()),
        PatternMatcher::first_group("key-words", KEY_WORDS_RE.clone()),
        PatternMatcher::first_group("index-terms", INDEX_TERMS_RE.clone()),
    ]
}

pub(crate) fn default_split_re() -> Regex {
    SPLIT_RE.clone()
}

/// Locate an explicit keywords section ("Keywords:", "Key words:",
/// "Index Terms—") and split it into terms.
///
/// Returns `None` when no header matches or every match filters down to
/// nothing. The caller decides whether the list is long enough to trust
/// (see [`ParsingConfig::min_section_terms`]).
pub fn find_keywords_section(text: &str) -> Option<Vec<String>> {
    find_keywords_section_with_config(text, &DEFAULT_CONFIG)
}

/// Config-aware version of [`find_keywords_section`].
pub(crate) fn find_keywords_section_with_config(
    text: &str,
    config: &ParsingConfig,
) -> Option<Vec<String>> {
    let (name, terms) = first_accepted(&config.keyword_matchers, text, |span| {
        let terms = split_terms(&span, config);
        (!terms.is_empty()).then_some(terms)
    })?;
    tracing::debug!(matcher = name, terms = terms.len(), "keywords section found");
    Some(terms)
}

/// Split a captured keywords span on the configured delimiters, keeping
/// terms whose length is strictly within the configured bounds.
pub(crate) fn split_terms(span: &str, config: &ParsingConfig) -> Vec<String> {
    config
        .keyword_split_re
        .split(span)
        .map(|piece| WS_RE.replace_all(piece.trim(), " ").into_owned())
        .filter(|term| {
            let len = term.chars().count();
            len > config.min_term_chars && len < config.max_term_chars
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;

    #[test]
    fn test_splits_on_every_delimiter() {
        let text = "Keywords: protein folding, molecular dynamics; cell biology and simulation\n\n1 Introduction";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(
            terms,
            vec![
                "protein folding",
                "molecular dynamics",
                "cell biology",
                "simulation"
            ]
        );
    }

    #[test]
    fn test_bullets_and_middle_dots() {
        let text = "KEYWORDS • graph theory · spectral methods • clustering\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(terms, vec!["graph theory", "spectral methods", "clustering"]);
    }

    #[test]
    fn test_single_letter_terms_filtered() {
        let text = "Keywords: a, b; c and d\n";
        assert!(find_keywords_section(text).is_none());
    }

    #[test]
    fn test_key_words_header() {
        let text = "Some abstract text.\nKey words: neural networks; pruning; sparsity\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(terms, vec!["neural networks", "pruning", "sparsity"]);
    }

    #[test]
    fn test_index_terms_with_em_dash() {
        let text = "Index Terms\u{2014}wireless sensing, channel state information, gesture recognition\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(
            terms,
            vec![
                "wireless sensing",
                "channel state information",
                "gesture recognition"
            ]
        );
    }

    #[test]
    fn test_header_alone_on_line() {
        let cases = [
            (
                "Keywords:\nprotein folding, molecular dynamics, cell biology\n\n1 Introduction\n",
                vec!["protein folding", "molecular dynamics", "cell biology"],
            ),
            (
                "Key words \u{2013}\nneural networks; pruning; sparsity\n\nBody\n",
                vec!["neural networks", "pruning", "sparsity"],
            ),
            (
                "Index Terms\u{2014}\nwireless sensing, channel state information, gestures\n",
                vec!["wireless sensing", "channel state information", "gestures"],
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(find_keywords_section(text).unwrap(), expected, "{text:?}");
        }
    }

    #[test]
    fn test_bare_header_without_terms_falls_through() {
        let text = "Keywords:\n\nIndex Terms: compilers, type systems, inference\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(terms, vec!["compilers", "type systems", "inference"]);
    }

    #[test]
    fn test_continuation_line_included() {
        let text = "Keywords: privacy, differential privacy,\nfederated learning, secure aggregation\n\nBody";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(
            terms,
            vec![
                "privacy",
                "differential privacy",
                "federated learning",
                "secure aggregation"
            ]
        );
    }

    #[test]
    fn test_long_continuation_line_excluded() {
        let long_line = "x".repeat(90);
        let text = format!("Keywords: alpha beta, gamma delta, epsilon zeta\n{}\n", long_line);
        let terms = find_keywords_section(&text).unwrap();
        assert_eq!(terms, vec!["alpha beta", "gamma delta", "epsilon zeta"]);
    }

    #[test]
    fn test_overlong_terms_dropped() {
        let long_term = "word ".repeat(12);
        let text = format!("Keywords: {}; robotics; control\n", long_term.trim());
        let terms = find_keywords_section(&text).unwrap();
        assert_eq!(terms, vec!["robotics", "control"]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let text = "Keywords: robotics, control, robotics\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(terms, vec!["robotics", "control", "robotics"]);
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        // "Keywords" appears first, so "Index Terms" is never consulted.
        let text = "Keywords: routing, congestion\n\nIndex Terms: alpha one, beta two, gamma three\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(terms, vec!["routing", "congestion"]);
        assert!(!terms.iter().any(|t| t.contains("alpha")));
    }

    #[test]
    fn test_empty_match_falls_through_to_next_pattern() {
        let text = "Keywords: a, b\n\nIndex Terms: compilers, type systems, inference\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(terms, vec!["compilers", "type systems", "inference"]);
    }

    #[test]
    fn test_and_inside_word_not_split() {
        let text = "Keywords: bandwidth, android security, random sampling\n";
        let terms = find_keywords_section(text).unwrap();
        assert_eq!(
            terms,
            vec!["bandwidth", "android security", "random sampling"]
        );
    }

    #[test]
    fn test_no_section() {
        assert!(find_keywords_section("Abstract\nWe study things.\n").is_none());
    }

    #[test]
    fn test_custom_split_regex() {
        let config = ParsingConfigBuilder::new()
            .keyword_split_regex(r"/")
            .build()
            .unwrap();
        let terms =
            find_keywords_section_with_config("Keywords: lidar / mapping / slam\n", &config)
                .unwrap();
        assert_eq!(terms, vec!["lidar", "mapping", "slam"]);
    }
}
