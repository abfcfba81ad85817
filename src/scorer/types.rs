use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every scoring component for one text, for diagnostics and calibration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    pub bigram: f64,
    pub trigram: f64,
    pub quadgram: f64,
    pub crib_bonus: f64,
    pub rarity_crib_bonus: f64,
    pub positional: f64,
    pub letter_coverage: f64,
    pub wordlist_hit_rate: f64,

    // Weighted sum under the active weights. 0.0 (not -inf) for empty text.
    pub combined: f64,
}

impl BaselineStats {
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("bigram".to_string(), self.bigram),
            ("trigram".to_string(), self.trigram),
            ("quadgram".to_string(), self.quadgram),
            ("crib_bonus".to_string(), self.crib_bonus),
            ("rarity_crib_bonus".to_string(), self.rarity_crib_bonus),
            ("positional".to_string(), self.positional),
            ("letter_coverage".to_string(), self.letter_coverage),
            ("wordlist_hit_rate".to_string(), self.wordlist_hit_rate),
            ("combined".to_string(), self.combined),
        ])
    }
}
