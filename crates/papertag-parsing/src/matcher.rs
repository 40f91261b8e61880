//! Ordered pattern + extraction-function matchers.
//!
//! Each heuristic (keywords header, abstract boundaries) is a list of
//! [`PatternMatcher`]s tried in order; the first one whose extraction
//! function accepts the match wins.

use std::fmt;

use regex::{Captures, Regex};

/// Turns the captures of a successful regex match into an extracted span.
pub type ExtractFn = fn(&Captures<'_>) -> Option<String>;

/// A named regex paired with the function that pulls the span out of it.
#[derive(Clone)]
pub struct PatternMatcher {
    name: String,
    regex: Regex,
    extract: ExtractFn,
}

impl fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("name", &self.name)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

impl PatternMatcher {
    pub fn new(name: impl Into<String>, regex: Regex, extract: ExtractFn) -> Self {
        Self {
            name: name.into(),
            regex,
            extract,
        }
    }

    /// A matcher that extracts capture group 1 (or the whole match when the
    /// pattern has no groups).
    pub fn first_group(name: impl Into<String>, regex: Regex) -> Self {
        Self::new(name, regex, first_group)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the pattern against `text` and extract the span from its first match.
    pub fn apply(&self, text: &str) -> Option<String> {
        self.regex.captures(text).and_then(|caps| (self.extract)(&caps))
    }
}

fn first_group(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().to_string())
}

/// Try `matchers` in order, feeding each extracted span to `accept`.
/// Returns the name of the winning matcher and the accepted value.
pub fn first_accepted<'a, T>(
    matchers: &'a [PatternMatcher],
    text: &str,
    mut accept: impl FnMut(String) -> Option<T>,
) -> Option<(&'a str, T)> {
    matchers.iter().find_map(|m| {
        m.apply(text)
            .and_then(&mut accept)
            .map(|value| (m.name(), value))
    })
}
