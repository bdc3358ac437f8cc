//! Letter-set classification of the corpus.
//!
//! Groups words into anagram classes keyed by their distinct-letter
//! signature. Words with repeated letters carry strictly less coverage per
//! character than their length and are discarded up front.

use crate::core::signature::Signature;
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from a letter signature to the words sharing it.
pub type AnagramClasses = BTreeMap<Signature, BTreeSet<String>>;

/// Filter a corpus down to heterograms of the given base word length.
///
/// A word survives only if it has exactly `word_length` characters, all of
/// them distinct ASCII lowercase letters. The pipeline's stage cardinalities
/// are multiples of `word_length`, so mixed-length words cannot participate.
pub fn heterogram_words(words: &BTreeSet<String>, word_length: usize) -> BTreeSet<String> {
    words
        .iter()
        .filter(|word| word.len() == word_length && Signature::try_from_word(word).is_some())
        .cloned()
        .collect()
}

/// Group heterogram words into anagram classes.
///
/// Deterministic and pure; words that fail the heterogram constraint are
/// skipped rather than reported, matching [`heterogram_words`].
pub fn anagram_classes(heterograms: &BTreeSet<String>) -> AnagramClasses {
    let mut classes = AnagramClasses::new();
    for word in heterograms {
        if let Some(signature) = Signature::try_from_word(word) {
            classes
                .entry(signature)
                .or_default()
                .insert(word.clone());
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_heterogram_filter_drops_repeats() {
        let words = corpus(&["ab", "cd", "aa", "ef", "ba"]);
        let kept = heterogram_words(&words, 2);
        assert_eq!(kept, corpus(&["ab", "ba", "cd", "ef"]));
    }

    #[test]
    fn test_heterogram_filter_drops_wrong_length() {
        let words = corpus(&["ab", "abc", "a", "cd"]);
        let kept = heterogram_words(&words, 2);
        assert_eq!(kept, corpus(&["ab", "cd"]));
    }

    #[test]
    fn test_anagram_classes_group_by_signature() {
        let words = corpus(&["ab", "ba", "cd", "ef"]);
        let classes = anagram_classes(&words);

        assert_eq!(classes.len(), 3);

        let ab: Signature = "ab".parse().unwrap();
        let cd: Signature = "cd".parse().unwrap();
        let ef: Signature = "ef".parse().unwrap();

        assert_eq!(classes[&ab], corpus(&["ab", "ba"]));
        assert_eq!(classes[&cd], corpus(&["cd"]));
        assert_eq!(classes[&ef], corpus(&["ef"]));
    }

    #[test]
    fn test_every_word_matches_its_key() {
        let words = corpus(&["alert", "later", "alter", "crwth", "fjord"]);
        let classes = anagram_classes(&words);
        for (signature, members) in &classes {
            for word in members {
                assert_eq!(Signature::try_from_word(word), Some(*signature));
            }
        }
    }

    #[test]
    fn test_empty_corpus() {
        let classes = anagram_classes(&BTreeSet::new());
        assert!(classes.is_empty());
    }
}
