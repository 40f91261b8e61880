use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{DEFAULT_CONFIG, ParsingConfig};
use crate::matcher::{PatternMatcher, first_accepted};

/// Title and abstract isolated from the leading text of a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
}

impl Segments {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.abstract_text.is_none()
    }
}

static HEADER_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)journal|proceedings|conference|volume|doi:|arxiv").unwrap());

// Abstract up to the next section header: "Introduction", "Keywords",
// "1." or a Roman "I." (the latter kept case-sensitive so "i.e." at the
// start of a line is not a header).
static ABSTRACT_TO_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)\babstract\b[\s:.\-\u{2013}\u{2014}]*(.*?)\n\s*(?:introduction\b|keywords?\b|1\.\s|(?-i:I)\.\s)",
    )
    .unwrap()
});

// Abstract up to the first blank line.
static ABSTRACT_TO_BLANK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\babstract\b[\s:.\-\u{2013}\u{2014}]*(.*?)\n[ \t]*\n").unwrap()
});

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub(crate) fn default_header_noise_re() -> Regex {
    HEADER_NOISE_RE.clone()
}

pub(crate) fn default_abstract_matchers() -> Vec<PatternMatcher> {
    vec![
        PatternMatcher::first_group("abstract-to-section", ABSTRACT_TO_SECTION_RE.clone()),
        PatternMatcher::first_group("abstract-to-blank-line", ABSTRACT_TO_BLANK_RE.clone()),
    ]
}

/// Isolate the title and abstract of a paper from its leading text.
pub fn segment(text: &str) -> Segments {
    segment_with_config(text, &DEFAULT_CONFIG)
}

pub(crate) fn segment_with_config(text: &str, config: &ParsingConfig) -> Segments {
    let segments = Segments {
        title: extract_title_with_config(text, config),
        abstract_text: extract_abstract_with_config(text, config),
    };
    tracing::debug!(
        title = segments.title.is_some(),
        abstract_chars = segments.abstract_text.as_ref().map(|a| a.chars().count()),
        "segmented title/abstract"
    );
    segments
}

/// Guess the paper title from the first non-blank lines.
///
/// Header-noise lines (journal names, DOIs, arXiv stamps) are skipped. The
/// first line of plausible length seeds the title; following lines extend it
/// only while they are long enough, and the first line that isn't stops the
/// scan for good.
pub fn extract_title(text: &str) -> Option<String> {
    extract_title_with_config(text, &DEFAULT_CONFIG)
}

pub(crate) fn extract_title_with_config(text: &str, config: &ParsingConfig) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(config.title_scan_lines);

    for line in lines {
        if config.header_noise_re.is_match(line) {
            continue;
        }
        let len = line.chars().count();
        let plausible = len > config.title_min_chars && len < config.title_max_chars;

        if parts.is_empty() {
            if plausible {
                parts.push(line);
            }
        } else if plausible && len > config.title_extend_chars {
            parts.push(line);
        } else {
            break;
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(WS_RE.replace_all(&parts.join(" "), " ").into_owned())
}

/// Capture the abstract: text after an "Abstract" header up to the next
/// section header, or failing that up to the next blank line. Truncated to
/// the configured maximum length.
pub fn extract_abstract(text: &str) -> Option<String> {
    extract_abstract_with_config(text, &DEFAULT_CONFIG)
}

pub(crate) fn extract_abstract_with_config(text: &str, config: &ParsingConfig) -> Option<String> {
    let (name, abstract_text) = first_accepted(&config.abstract_matchers, text, |span| {
        let trimmed = span.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(truncate_chars(trimmed, config.max_abstract_chars).to_string())
    })?;
    tracing::debug!(matcher = name, "abstract found");
    Some(abstract_text)
}

/// Cut `s` to at most `max` characters without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
