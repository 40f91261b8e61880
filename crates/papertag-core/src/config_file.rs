use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub keywords: Option<KeywordsConfig>,
    pub nlp: Option<NlpConfig>,
    pub concurrency: Option<ConcurrencyConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub max_pages: Option<usize>,
    pub tool_timeout_secs: Option<u64>,
    pub pdftotext_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsConfig {
    pub max_keywords: Option<usize>,
    pub min_section_terms: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NlpConfig {
    pub enabled: Option<bool>,
    pub annotator_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub num_workers: Option<usize>,
}

impl ConfigFile {
    /// Overwrite the fields of `config` that this file sets.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ext) = &self.extraction {
            if let Some(v) = ext.max_pages {
                config.max_pages = v;
            }
            if let Some(v) = ext.tool_timeout_secs {
                config.tool_timeout_secs = v;
            }
            if let Some(v) = &ext.pdftotext_path {
                config.pdftotext_path = PathBuf::from(v);
            }
        }
        if let Some(kw) = &self.keywords {
            if let Some(v) = kw.max_keywords {
                config.max_keywords = v;
            }
            if let Some(v) = kw.min_section_terms {
                config.min_section_terms = v;
            }
        }
        if let Some(nlp) = &self.nlp {
            if let Some(v) = nlp.enabled {
                config.nlp_enabled = v;
            }
            if let Some(v) = &nlp.annotator_command {
                config.annotator_command = Some(v.clone());
            }
        }
        if let Some(v) = self.concurrency.as_ref().and_then(|c| c.num_workers) {
            config.num_workers = v;
        }
    }

    /// Snapshot a runtime config as a fully populated file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            extraction: Some(ExtractionConfig {
                max_pages: Some(config.max_pages),
                tool_timeout_secs: Some(config.tool_timeout_secs),
                pdftotext_path: Some(config.pdftotext_path.display().to_string()),
            }),
            keywords: Some(KeywordsConfig {
                max_keywords: Some(config.max_keywords),
                min_section_terms: Some(config.min_section_terms),
            }),
            nlp: Some(NlpConfig {
                enabled: Some(config.nlp_enabled),
                annotator_command: config.annotator_command.clone(),
            }),
            concurrency: Some(ConcurrencyConfig {
                num_workers: Some(config.num_workers),
            }),
        }
    }
}

/// Platform config directory path: `<config_dir>/papertag/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("papertag").join("config.toml"))
}

/// Load config by cascading CWD `.papertag.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".papertag.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

fn pick<S, T>(overlay: Option<&S>, base: Option<&S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (bk, ok) = (base.keywords.as_ref(), overlay.keywords.as_ref());
    let (bn, on) = (base.nlp.as_ref(), overlay.nlp.as_ref());
    let (bc, oc) = (base.concurrency.as_ref(), overlay.concurrency.as_ref());

    ConfigFile {
        extraction: Some(ExtractionConfig {
            max_pages: pick(oe, be, |e| e.max_pages),
            tool_timeout_secs: pick(oe, be, |e| e.tool_timeout_secs),
            pdftotext_path: pick(oe, be, |e| e.pdftotext_path.clone()),
        }),
        keywords: Some(KeywordsConfig {
            max_keywords: pick(ok, bk, |k| k.max_keywords),
            min_section_terms: pick(ok, bk, |k| k.min_section_terms),
        }),
        nlp: Some(NlpConfig {
            enabled: pick(on, bn, |n| n.enabled),
            annotator_command: pick(on, bn, |n| n.annotator_command.clone()),
        }),
        concurrency: Some(ConcurrencyConfig {
            num_workers: pick(oc, bc, |c| c.num_workers),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Save the config to an explicit path, creating parent directories.
pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))
}
