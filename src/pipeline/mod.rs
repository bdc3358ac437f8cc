//! Staged pipeline orchestrator.
//!
//! Sequences the five composition stages over the corpus, each consuming
//! specific prior stages and cached independently in the stage store. Every
//! stage method takes a `force` flag that recomputes that stage only:
//! forcing an upstream stage does NOT cascade to stages derived from it, so
//! callers changing upstream data must force the full chain themselves; [`Pipeline::run`]
//! with `force = true` does exactly that, in dependency order.
//!
//! The pipeline owns its store exclusively for its lifetime; see
//! [`crate::cache::store`] for the single-writer precondition.

use crate::cache::StageStore;
use crate::config::PipelineConfig;
use crate::core::classify::{anagram_classes, heterogram_words, AnagramClasses};
use crate::core::compose::CompositionMap;
use crate::core::expand::{NavigableMap, StageLookup};
use crate::core::parallel::compose_partitioned;
use crate::core::signature::Signature;
use crate::core::verify_acyclic;
use crate::io::artifact::{artifact_from_stages, write_json};
use crate::io::corpus::{normalize_word_list, HttpSource, WordSource};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Store keys, one per pipeline stage.
pub mod keys {
    pub const ANSWER_WORDS: &str = "answer_words";
    pub const ALLOWED_GUESS_WORDS: &str = "allowed_guess_words";
    pub const ALL_WORDS_SET: &str = "all_words_set";
    pub const HETEROGRAM_SET: &str = "heterogram_set";
    pub const ANAGRAM_MAP: &str = "anagram_map";
    pub const TWO_WORD_MAP: &str = "two_word_map";
    pub const THREE_WORD_MAP: &str = "three_word_map";
    pub const FOUR_WORD_MAP: &str = "four_word_map";
    pub const FIVE_WORD_MAP: &str = "five_word_map";
}

/// The staged pipeline: corpus stages, composition stages, and expansion.
pub struct Pipeline {
    store: StageStore,
    config: PipelineConfig,
    source: Box<dyn WordSource>,
}

impl Pipeline {
    /// Build a pipeline with the HTTP corpus source.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let source = Box::new(HttpSource::new()?);
        Self::with_source(config, source)
    }

    /// Build a pipeline with an explicit corpus source (used by tests).
    pub fn with_source(config: PipelineConfig, source: Box<dyn WordSource>) -> Result<Self> {
        let store = StageStore::open(&config.store_path)?;
        Ok(Self {
            store,
            config,
            source,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Timing history for a stage key, one sample per compute event.
    pub fn times_ns(&self, key: &str) -> Result<Vec<u64>> {
        self.store.times_ns(key)
    }

    /// Fast path for the staged methods: the cached value when present and
    /// not forced, so upstream inputs are only assembled on a miss.
    fn cached<T: DeserializeOwned>(&self, key: &str, force: bool) -> Result<Option<T>> {
        if force {
            return Ok(None);
        }
        let value = self.store.lookup(key)?;
        if value.is_some() {
            log::debug!("found cached value for {key}");
        }
        Ok(value)
    }

    pub fn answer_words(&mut self, force: bool) -> Result<BTreeSet<String>> {
        let url = self.config.answer_list_url.clone();
        let source = &self.source;
        self.store.get_or_compute(keys::ANSWER_WORDS, force, || {
            let lines = source.fetch(&url)?;
            Ok(normalize_word_list(&lines))
        })
    }

    pub fn guess_words(&mut self, force: bool) -> Result<BTreeSet<String>> {
        let url = self.config.guess_list_url.clone();
        let source = &self.source;
        self.store
            .get_or_compute(keys::ALLOWED_GUESS_WORDS, force, || {
                let lines = source.fetch(&url)?;
                Ok(normalize_word_list(&lines))
            })
    }

    /// Union of the answer and allowed-guess lists.
    pub fn all_words(&mut self, force: bool) -> Result<BTreeSet<String>> {
        if let Some(cached) = self.cached(keys::ALL_WORDS_SET, force)? {
            return Ok(cached);
        }
        let answers = self.answer_words(false)?;
        let guesses = self.guess_words(false)?;
        self.store.get_or_compute(keys::ALL_WORDS_SET, force, move || {
            Ok(answers.union(&guesses).cloned().collect())
        })
    }

    /// Corpus words with all-distinct letters at the configured length.
    pub fn heterogram_words(&mut self, force: bool) -> Result<BTreeSet<String>> {
        if let Some(cached) = self.cached(keys::HETEROGRAM_SET, force)? {
            return Ok(cached);
        }
        let words = self.all_words(false)?;
        let word_length = self.config.word_length;
        self.store
            .get_or_compute(keys::HETEROGRAM_SET, force, move || {
                let kept = heterogram_words(&words, word_length);
                log::debug!("{} heterograms of {} corpus words", kept.len(), words.len());
                Ok(kept)
            })
    }

    /// Heterograms grouped by letter signature.
    pub fn anagram_classes(&mut self, force: bool) -> Result<AnagramClasses> {
        if let Some(cached) = self.cached(keys::ANAGRAM_MAP, force)? {
            return Ok(cached);
        }
        let heterograms = self.heterogram_words(false)?;
        self.store.get_or_compute(keys::ANAGRAM_MAP, force, move || {
            Ok(anagram_classes(&heterograms))
        })
    }

    /// 2-word stage: anagram signatures composed against themselves.
    pub fn two_word_map(&mut self, force: bool) -> Result<CompositionMap> {
        if let Some(cached) = self.cached(keys::TWO_WORD_MAP, force)? {
            return Ok(cached);
        }
        let base = self.anagram_signatures()?;
        self.compose_stage(keys::TWO_WORD_MAP, force, base.clone(), base)
    }

    /// 3-word stage: 2-word signatures composed against anagram signatures.
    pub fn three_word_map(&mut self, force: bool) -> Result<CompositionMap> {
        if let Some(cached) = self.cached(keys::THREE_WORD_MAP, force)? {
            return Ok(cached);
        }
        let outer = stage_signatures(&self.two_word_map(false)?);
        let inner = self.anagram_signatures()?;
        self.compose_stage(keys::THREE_WORD_MAP, force, outer, inner)
    }

    /// 4-word stage: 2-word signatures composed against themselves.
    pub fn four_word_map(&mut self, force: bool) -> Result<CompositionMap> {
        if let Some(cached) = self.cached(keys::FOUR_WORD_MAP, force)? {
            return Ok(cached);
        }
        let two = stage_signatures(&self.two_word_map(false)?);
        self.compose_stage(keys::FOUR_WORD_MAP, force, two.clone(), two)
    }

    /// 5-word stage: 4-word signatures composed against anagram signatures.
    pub fn five_word_map(&mut self, force: bool) -> Result<CompositionMap> {
        if let Some(cached) = self.cached(keys::FIVE_WORD_MAP, force)? {
            return Ok(cached);
        }
        let outer = stage_signatures(&self.four_word_map(false)?);
        let inner = self.anagram_signatures()?;
        self.compose_stage(keys::FIVE_WORD_MAP, force, outer, inner)
    }

    fn anagram_signatures(&mut self) -> Result<Vec<Signature>> {
        Ok(self.anagram_classes(false)?.keys().copied().collect())
    }

    fn compose_stage(
        &mut self,
        key: &str,
        force: bool,
        outer: Vec<Signature>,
        inner: Vec<Signature>,
    ) -> Result<CompositionMap> {
        let parallel = self.config.parallel.clone();
        self.store.get_or_compute(key, force, move || {
            let snapshot: Arc<[Signature]> = inner.into();
            log::debug!(
                "{key}: composing {} outer x {} inner signatures",
                outer.len(),
                snapshot.len()
            );
            Ok(compose_partitioned(&outer, &snapshot, &parallel))
        })
    }

    /// Read access to every stage, for expansion. Stages not yet computed
    /// are computed (and cached) on the way.
    pub fn stage_lookup(&mut self) -> Result<StageLookup> {
        Ok(StageLookup::new(
            self.config.word_length,
            self.anagram_classes(false)?,
            self.two_word_map(false)?,
            self.three_word_map(false)?,
            self.four_word_map(false)?,
            self.five_word_map(false)?,
        ))
    }

    /// Run the full pipeline and expand every 5-word signature into the
    /// navigable result, verified for structural consistency.
    ///
    /// `force = true` recomputes every stage in dependency order, the
    /// documented way to refresh the whole chain after upstream data
    /// changes.
    pub fn run(&mut self, force: bool) -> Result<NavigableMap> {
        self.answer_words(force)?;
        self.guess_words(force)?;
        self.all_words(force)?;
        self.heterogram_words(force)?;
        self.anagram_classes(force)?;
        self.two_word_map(force)?;
        self.three_word_map(force)?;
        self.four_word_map(force)?;
        let five = self.five_word_map(force)?;

        let lookup = self.stage_lookup()?;
        let navigable = lookup.navigable_map(five.keys().copied())?;
        verify_acyclic(&navigable)?;
        log::info!(
            "expanded {} five-word signatures into {} graph nodes",
            five.len(),
            navigable.entries.len()
        );
        Ok(navigable)
    }

    /// Dump every stage map (anagram classes included) under its stage name.
    pub fn dump_stage_maps(&mut self, path: &Path) -> Result<()> {
        let classes = self.anagram_classes(false)?;
        let two = self.two_word_map(false)?;
        let three = self.three_word_map(false)?;
        let four = self.four_word_map(false)?;
        let five = self.five_word_map(false)?;
        let dump = artifact_from_stages(
            &classes,
            &[
                (keys::TWO_WORD_MAP, &two),
                (keys::THREE_WORD_MAP, &three),
                (keys::FOUR_WORD_MAP, &four),
                (keys::FIVE_WORD_MAP, &five),
            ],
        );
        write_json(path, &dump)
    }
}

/// The signature keys of a computed stage.
fn stage_signatures(stage: &CompositionMap) -> Vec<Signature> {
    stage.keys().copied().collect()
}
