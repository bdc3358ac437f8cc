//! Word-list loading.
//!
//! The corpus arrives as plain-text lists, one word per line. Fetch failures
//! are fatal at load time and never retried.

use crate::errors::Error;
use anyhow::Result;
use std::collections::BTreeSet;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw word-list lines. Tests substitute a fixed in-memory source.
pub trait WordSource {
    /// Fetch the raw lines of the list at `url`, in order.
    fn fetch(&self, url: &str) -> Result<Vec<String>>;
}

/// HTTP word-list source.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl WordSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Vec<String>> {
        log::info!("fetching word list from {url}");
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|source| Error::CorpusFetch {
                url: url.to_string(),
                source,
            })?;
        Ok(body.lines().map(str::to_owned).collect())
    }
}

/// Normalize raw list lines into the corpus word set: trim surrounding
/// whitespace, case-fold to lowercase, drop empty lines.
pub fn normalize_word_list(lines: &[String]) -> BTreeSet<String> {
    lines
        .iter()
        .map(|line| line.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_trims_and_casefolds() {
        let raw = lines(&["  CRANE ", "fjord", "\tSLATE\t"]);
        let words = normalize_word_list(&raw);
        let expected: BTreeSet<String> = ["crane", "fjord", "slate"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn test_normalize_drops_empty_lines() {
        let raw = lines(&["crane", "", "   ", "slate"]);
        assert_eq!(normalize_word_list(&raw).len(), 2);
    }

    #[test]
    fn test_normalize_dedups() {
        let raw = lines(&["crane", "CRANE", " crane"]);
        assert_eq!(normalize_word_list(&raw).len(), 1);
    }
}
