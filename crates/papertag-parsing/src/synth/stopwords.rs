/// Generic academic nouns that never make useful tags.
pub const DOMAIN_STOP_WORDS: &[&str] = &[
    "paper",
    "study",
    "research",
    "article",
    "work",
    "approach",
    "method",
    "result",
    "conclusion",
    "introduction",
    "section",
];

/// Function words and boilerplate academic vocabulary ignored by the
/// frequency strategy.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "has", "his", "how", "its", "may", "new", "now", "two", "who", "use", "this",
    "that", "with", "have", "from", "they", "been", "were", "which", "their", "there", "these",
    "those", "than", "then", "them", "also", "into", "such", "some", "more", "most", "other",
    "each", "only", "over", "both", "between", "through", "about", "while", "where", "when",
    "what", "would", "could", "should", "paper", "study", "research", "article", "using",
    "based", "results", "show", "shows", "propose", "proposed", "present", "method", "methods",
    "approach",
];
