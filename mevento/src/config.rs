//! Interpreter configuration.
//!
//! Loadable from TOML:
//!
//! ```toml
//! cache = true
//! debug = false
//! max_iterations = 100000
//!
//! [languages.de]
//! wenn = "if"
//! sonst = "else"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lexer::keywords;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("language `{language}`: `{spelling}` maps to unknown keyword `{id}`")]
    UnknownKeyword {
        language: String,
        spelling: String,
        id: String,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read config from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Configuration for an interpreter instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Memoize compiled sources in `Interpreter::eval`.
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Log compile/execute events at info level instead of debug.
    #[serde(default)]
    pub debug: bool,

    /// Abort any single loop after this many iterations.
    #[serde(default)]
    pub max_iterations: Option<u64>,

    /// Extra keyword dictionaries: tag → spelling → canonical keyword id.
    #[serde(default)]
    pub languages: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_cache() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: default_cache(),
            debug: false,
            max_iterations: None,
            languages: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Register the configured dictionaries into the process-wide language table.
    pub fn register_languages(&self) -> Result<(), ConfigError> {
        for (tag, words) in &self.languages {
            keywords::register_language(tag, words.iter().map(|(spelling, id)| (spelling.clone(), id)))?;
        }
        Ok(())
    }
}
