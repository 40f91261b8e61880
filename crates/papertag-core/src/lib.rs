use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub mod backend;
pub mod config_file;
pub mod subprocess;

pub use backend::{BackendError, PdfBackend};

/// Error reported when no backend produced any text.
pub const ERR_NO_TEXT: &str = "Could not extract text from PDF";
/// Error reported when text was found but yielded no usable keywords.
pub const ERR_INSUFFICIENT: &str = "Could not extract sufficient keywords";

/// How the keywords of a document were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    None,
    KeywordsSection,
    TitleAbstract,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::KeywordsSection => "keywords-section",
            Self::TitleAbstract => "title-abstract",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the keyword pipeline on one document.
///
/// `error` is set exactly when `keywords` is empty, and `method` is
/// [`ExtractionMethod::None`] exactly when `error` is set. The fields are
/// private so the two constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    #[serde(rename = "file")]
    file_name: String,
    keywords: Vec<String>,
    method: ExtractionMethod,
    error: Option<String>,
}

impl ExtractionResult {
    /// A successful extraction. An empty keyword list, or a `None` method,
    /// is not a success and becomes an insufficient-keywords failure.
    pub fn success(
        file_name: impl Into<String>,
        method: ExtractionMethod,
        keywords: Vec<String>,
    ) -> Self {
        let file_name = file_name.into();
        if keywords.is_empty() || method == ExtractionMethod::None {
            return Self::failure(file_name, ERR_INSUFFICIENT);
        }
        Self {
            file_name,
            keywords,
            method,
            error: None,
        }
    }

    pub fn failure(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            keywords: Vec::new(),
            method: ExtractionMethod::None,
            error: Some(error.into()),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Display name for a document path (its final component).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Progress events emitted while a batch is processed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Finished {
        index: usize,
        total: usize,
        result: Box<ExtractionResult>,
    },
}

/// Summary statistics for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub keywords_section: usize,
    pub title_abstract: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ExtractionResult>) -> Self {
        let mut stats = Self::default();
        for r in results {
            stats.total += 1;
            match r.method() {
                ExtractionMethod::KeywordsSection => stats.keywords_section += 1,
                ExtractionMethod::TitleAbstract => stats.title_abstract += 1,
                ExtractionMethod::None => stats.failed += 1,
            }
        }
        stats
    }
}

/// Runtime configuration for the keyword pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_keywords: usize,
    pub max_pages: usize,
    /// Minimum number of terms for an explicit keywords section to be trusted.
    pub min_section_terms: usize,
    pub tool_timeout_secs: u64,
    pub num_workers: usize,
    pub pdftotext_path: PathBuf,
    /// Command line of the NLP annotator process. `None` means frequency only.
    pub annotator_command: Option<Vec<String>>,
    pub nlp_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_keywords: 5,
            max_pages: 2,
            min_section_terms: 3,
            tool_timeout_secs: 30,
            num_workers: 4,
            pdftotext_path: PathBuf::from("pdftotext"),
            annotator_command: None,
            nlp_enabled: true,
        }
    }
}

impl Config {
    pub fn tool_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tool_timeout_secs)
    }

    /// The annotator command if NLP is enabled and one is configured.
    pub fn active_annotator(&self) -> Option<&[String]> {
        if !self.nlp_enabled {
            return None;
        }
        self.annotator_command
            .as_deref()
            .filter(|argv| !argv.is_empty())
    }
}
