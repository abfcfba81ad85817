use crate::alphabet::normalize;
use serde::{Deserialize, Serialize};

/// A diagnostic word expected in the plaintext, with its corpus frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crib {
    pub text: String,
    pub frequency: f64,
}

impl Crib {
    pub fn new(text: &str, frequency: f64) -> Self {
        let frequency = if frequency.is_finite() && frequency > 0.0 {
            frequency
        } else {
            1.0
        };
        Self {
            text: normalize(text),
            frequency,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CribSet {
    cribs: Vec<Crib>,
    total_frequency: f64,
}

impl CribSet {
    /// Empty cribs and duplicates (first occurrence wins) are dropped.
    pub fn new(cribs: Vec<Crib>) -> Self {
        let mut kept: Vec<Crib> = Vec::with_capacity(cribs.len());
        for c in cribs {
            if c.text.is_empty() || kept.iter().any(|k| k.text == c.text) {
                continue;
            }
            kept.push(c);
        }
        let total_frequency = kept.iter().map(|c| c.frequency).sum();
        Self {
            cribs: kept,
            total_frequency,
        }
    }

    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        Self::new(words.iter().map(|w| Crib::new(w.as_ref(), 1.0)).collect())
    }

    pub fn cribs(&self) -> &[Crib] {
        &self.cribs
    }

    pub fn is_empty(&self) -> bool {
        self.cribs.is_empty()
    }

    pub fn matched<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Crib> + 'a {
        self.cribs.iter().filter(move |c| text.contains(c.text.as_str()))
    }

    /// One reward per crib present, equal to its length in letters.
    pub fn crib_bonus(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        self.matched(text).map(|c| c.text.len() as f64).sum()
    }

    /// Crib bonus scaled by `ln(1 + total / freq)`: rare cribs weigh more. Never negative.
    pub fn rarity_weighted_crib_bonus(&self, text: &str) -> f64 {
        if text.is_empty() || self.total_frequency <= 0.0 {
            return 0.0;
        }
        self.matched(text)
            .map(|c| c.text.len() as f64 * (1.0 + self.total_frequency / c.frequency).ln())
            .sum()
    }
}
