//! Extraction configuration.
//!
//! Values come from (in increasing priority) built-in defaults, an optional
//! TOML file, and command line overrides applied by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Default number of articles collected before the run stops.
pub const DEFAULT_MAX_ARTICLES: usize = 1000;

/// Default minimum length (in characters) of normalized content.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;

/// Default hard cap (in characters) on normalized content.
pub const DEFAULT_CONTENT_LENGTH_CAP: usize = 10_000;

/// Default size of the buffer the decompressed stream is read through.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Title prefixes of non-article pages rejected by default.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["Wikipedia:", "Template:", "Category:"];

/// Localized project, template and category prefixes of the Thai Wikipedia.
pub const THAI_EXCLUDED_PREFIXES: &[&str] = &["วิกิพีเดีย:", "แม่แบบ:", "หมวดหมู่:"];

/// Configuration for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Capacity of the collector; the run stops once this many articles are accepted
    pub max_articles: usize,
    /// Articles whose normalized content is shorter than this are dropped
    pub min_content_length: usize,
    /// Normalized content is truncated to this many characters
    pub content_length_cap: usize,
    /// Pages whose title starts with any of these are dropped
    pub excluded_title_prefixes: Vec<String>,
    /// Namespace id of ordinary articles
    pub main_namespace_id: i64,
    /// Read buffer size for the decompressed stream (bytes)
    pub read_chunk_size: usize,
    /// Optional script whitelist applied before whitespace collapse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_whitelist: Option<CharacterWhitelist>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_articles: DEFAULT_MAX_ARTICLES,
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            content_length_cap: DEFAULT_CONTENT_LENGTH_CAP,
            excluded_title_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            main_namespace_id: 0,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            character_whitelist: None,
        }
    }
}

/// Characters kept by the optional whitelist stage.
///
/// Alphanumeric characters and whitespace are always kept. Everything else
/// survives only if it falls in one of `ranges` or appears in `punctuation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterWhitelist {
    /// Inclusive code point ranges, e.g. `[["\u{0E00}", "\u{0E7F}"]]` for Thai
    #[serde(default)]
    pub ranges: Vec<(char, char)>,
    /// Individual punctuation characters to keep
    #[serde(default)]
    pub punctuation: String,
}

impl CharacterWhitelist {
    /// Thai script plus basic sentence punctuation.
    pub fn thai() -> Self {
        Self {
            ranges: vec![('\u{0E00}', '\u{0E7F}')],
            punctuation: ".,!?".to_string(),
        }
    }

    /// Whether `c` survives the whitelist.
    pub fn allows(&self, c: char) -> bool {
        c.is_alphanumeric()
            || c == '_'
            || c.is_whitespace()
            || self.punctuation.contains(c)
            || self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
    }
}

/// Language bundles layered over a configuration.
///
/// A preset replaces the excluded title prefixes and the character whitelist;
/// every other setting is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Thai namespace prefixes and [`CharacterWhitelist::thai`]
    Thai,
}

impl Preset {
    pub fn apply(self, config: &mut ExtractionConfig) {
        match self {
            Self::Thai => {
                config.excluded_title_prefixes = THAI_EXCLUDED_PREFIXES
                    .iter()
                    .map(|p| p.to_string())
                    .collect();
                config.character_whitelist = Some(CharacterWhitelist::thai());
            }
        }
    }
}

impl FromStr for Preset {
    type Err = ExtractError;

    fn from_str(name: &str) -> ExtractResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "thai" | "th" => Ok(Self::Thai),
            _ => Err(ExtractError::Config(format!(
                "unknown preset '{}' (available: thai)",
                name
            ))),
        }
    }
}

impl ExtractionConfig {
    /// Defaults with the Thai preset applied.
    pub fn thai() -> Self {
        let mut config = Self::default();
        Preset::Thai.apply(&mut config);
        config
    }

    /// Check that the configuration describes a runnable extraction.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.max_articles == 0 {
            return Err(ExtractError::Config(
                "max_articles must be at least 1".to_string(),
            ));
        }
        if self.min_content_length == 0 {
            return Err(ExtractError::Config(
                "min_content_length must be at least 1".to_string(),
            ));
        }
        if self.content_length_cap == 0 {
            return Err(ExtractError::Config(
                "content_length_cap must be at least 1".to_string(),
            ));
        }
        if self.content_length_cap < self.min_content_length {
            return Err(ExtractError::Config(format!(
                "content_length_cap ({}) is below min_content_length ({}); nothing could be accepted",
                self.content_length_cap, self.min_content_length
            )));
        }
        if self.read_chunk_size == 0 {
            return Err(ExtractError::Config(
                "read_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.excluded_title_prefixes.iter().any(|p| p.is_empty()) {
            return Err(ExtractError::Config(
                "excluded_title_prefixes must not contain an empty prefix".to_string(),
            ));
        }
        if let Some(whitelist) = &self.character_whitelist {
            if let Some(&(lo, hi)) = whitelist.ranges.iter().find(|(lo, hi)| lo > hi) {
                return Err(ExtractError::Config(format!(
                    "character_whitelist range {:?}..{:?} is reversed",
                    lo, hi
                )));
            }
        }
        Ok(())
    }

    /// Parse a configuration from TOML text. Missing fields take defaults.
    pub fn from_toml(content: &str) -> ExtractResult<Self> {
        toml::from_str(content).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> ExtractResult<String> {
        toml::to_string_pretty(self).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> ExtractResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from the default location, falling back to defaults if no file exists.
    pub fn load() -> ExtractResult<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default configuration file location.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wikiextract").join("config.toml"))
    }
}
