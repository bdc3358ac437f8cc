//! Pipeline configuration.
//!
//! All fields default to the reference behavior: the public Wordle answer
//! and allowed-guess lists, a store file under `data/`, and five-letter
//! words. An optional TOML file overrides any subset.

use crate::core::parallel::ParallelConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const WORDLE_ANSWERS_URL: &str = "https://gist.githubusercontent.com/cfreshman/a03ef2cba789d8cf00c08f767e0fad7b/raw/28804271b5a226628d36ee831b0e36adef9cf449/wordle-answers-alphabetical.txt";
pub const WORDLE_ALLOWED_GUESSES_URL: &str = "https://gist.githubusercontent.com/cfreshman/cdcdf777450c5b5301e439061d29694c/raw/b8375870720504ecf89c1970ea4532454f12de94/wordle-allowed-guesses.txt";

fn default_answer_url() -> String {
    WORDLE_ANSWERS_URL.to_string()
}

fn default_guess_url() -> String {
    WORDLE_ALLOWED_GUESSES_URL.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/store/wordclique.store")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/results.json")
}

fn default_word_length() -> usize {
    5
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// URL of the answer word list
    #[serde(default = "default_answer_url")]
    pub answer_list_url: String,

    /// URL of the allowed-guess word list
    #[serde(default = "default_guess_url")]
    pub guess_list_url: String,

    /// Stage store file
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Navigable-result artifact path
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Base word length; stage cardinalities are its multiples
    #[serde(default = "default_word_length")]
    pub word_length: usize,

    /// Parallel composition settings
    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            answer_list_url: default_answer_url(),
            guess_list_url: default_guess_url(),
            store_path: default_store_path(),
            output_path: default_output_path(),
            word_length: default_word_length(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from an optional TOML file; absent path means
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => {
                let raw = std::fs::read_to_string(config_path).with_context(|| {
                    format!("failed to read config file {}", config_path.display())
                })?;
                let config = toml::from_str(&raw).with_context(|| {
                    format!("failed to parse config file {}", config_path.display())
                })?;
                log::debug!("loaded config from {}", config_path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.word_length, 5);
        assert_eq!(config.answer_list_url, WORDLE_ANSWERS_URL);
        assert!(config.parallel.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            word_length = 4
            store_path = "elsewhere/cache.store"
            "#,
        )
        .unwrap();
        assert_eq!(config.word_length, 4);
        assert_eq!(config.store_path, PathBuf::from("elsewhere/cache.store"));
        assert_eq!(config.guess_list_url, WORDLE_ALLOWED_GUESSES_URL);
    }

    #[test]
    fn test_parallel_section_parses() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [parallel]
            enabled = false
            "#,
        )
        .unwrap();
        assert!(!config.parallel.enabled);
        assert!(config.parallel.max_concurrency.is_none());
    }

    #[test]
    fn test_load_missing_path_uses_defaults() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
