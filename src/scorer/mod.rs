pub mod builder;
pub mod cribs;
pub mod dictionary;
pub mod loader;
pub mod ngram;
pub mod positional;
pub mod types;

pub use self::builder::LanguageModelBuilder;
pub use self::types::BaselineStats;
use self::cribs::CribSet;
use self::dictionary::Wordlist;
use self::ngram::NgramTable;
use crate::config::ScoringWeights;
use crate::consts::ALPHABET_LEN;
use std::sync::Arc;

/// Shared, read-only scoring data. Loaded once per process and shared between stages.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    pub bigrams: NgramTable,
    pub trigrams: NgramTable,
    pub quadgrams: NgramTable,
    pub cribs: CribSet,
    pub wordlist: Wordlist,
}

impl Default for LanguageModel {
    fn default() -> Self {
        LanguageModelBuilder::new().build()
    }
}

/// A language model paired with the explicit weights every score is computed under.
///
/// Texts are expected in normalized form (`alphabet::normalize`); anything outside
/// A-Z is ignored by the n-gram and positional components.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub model: Arc<LanguageModel>,
    pub weights: ScoringWeights,
}

impl Scorer {
    pub fn new(model: Arc<LanguageModel>, weights: ScoringWeights) -> Self {
        Self { model, weights }
    }

    /// Same model, different weights. Used by calibration sweeps.
    pub fn with_weights(&self, weights: ScoringWeights) -> Self {
        Self {
            model: Arc::clone(&self.model),
            weights,
        }
    }

    pub fn bigram_score(&self, text: &str) -> f64 {
        self.model.bigrams.score(text.as_bytes())
    }

    pub fn trigram_score(&self, text: &str) -> f64 {
        self.model.trigrams.score(text.as_bytes())
    }

    pub fn quadgram_score(&self, text: &str) -> f64 {
        self.model.quadgrams.score(text.as_bytes())
    }

    pub fn crib_bonus(&self, text: &str) -> f64 {
        self.model.cribs.crib_bonus(text)
    }

    pub fn rarity_weighted_crib_bonus(&self, text: &str) -> f64 {
        self.model.cribs.rarity_weighted_crib_bonus(text)
    }

    pub fn positional_score(&self, text: &str) -> f64 {
        positional::positional_letter_deviation(text.as_bytes(), self.weights.effective_period())
    }

    pub fn wordlist_hit_rate(&self, text: &str) -> f64 {
        self.model.wordlist.hit_rate(text)
    }

    /// Weighted sum of all components. Text without letters scores -inf so it never wins.
    pub fn combined_score(&self, text: &str) -> f64 {
        if !has_letters(text) {
            return f64::NEG_INFINITY;
        }
        self.weighted_sum(text)
    }

    pub fn baseline_stats(&self, text: &str) -> BaselineStats {
        if !has_letters(text) {
            return BaselineStats::default();
        }
        BaselineStats {
            bigram: self.bigram_score(text),
            trigram: self.trigram_score(text),
            quadgram: self.quadgram_score(text),
            crib_bonus: self.crib_bonus(text),
            rarity_crib_bonus: self.rarity_weighted_crib_bonus(text),
            positional: self.positional_score(text),
            letter_coverage: letter_coverage(text),
            wordlist_hit_rate: self.wordlist_hit_rate(text),
            combined: self.weighted_sum(text),
        }
    }

    fn weighted_sum(&self, text: &str) -> f64 {
        let w = &self.weights;
        w.weight_bigram * self.bigram_score(text)
            + w.weight_trigram * self.trigram_score(text)
            + w.weight_quadgram * self.quadgram_score(text)
            + w.weight_crib * self.crib_bonus(text)
            + w.weight_rarity * self.rarity_weighted_crib_bonus(text)
            + w.weight_positional * self.positional_score(text)
    }
}

#[inline(always)]
fn has_letters(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_uppercase())
}

/// Share of the alphabet present in the text, in [0, 1].
pub fn letter_coverage(text: &str) -> f64 {
    let mut seen = [false; ALPHABET_LEN];
    for b in text.bytes().filter(|b| b.is_ascii_uppercase()) {
        seen[(b - b'A') as usize] = true;
    }
    seen.iter().filter(|&&s| s).count() as f64 / ALPHABET_LEN as f64
}
