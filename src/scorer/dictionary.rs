use crate::alphabet::normalize;
use crate::consts::{COMMON_WORDS, MIN_DICTIONARY_WORD_LEN};

/// Reference wordlist for dictionary-assisted ranking and hit-rate diagnostics.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Default for Wordlist {
    fn default() -> Self {
        Self::new(COMMON_WORDS)
    }
}

impl Wordlist {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let mut words: Vec<String> = words
            .iter()
            .map(|w| normalize(w.as_ref()))
            .filter(|w| w.len() >= MIN_DICTIONARY_WORD_LEN)
            .collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of letters covered by at least one occurrence of a listed word.
    pub fn coverage(&self, text: &str) -> usize {
        if text.is_empty() || self.words.is_empty() {
            return 0;
        }
        let mut covered = vec![false; text.len()];
        for word in &self.words {
            for (start, _) in text.match_indices(word.as_str()) {
                covered[start..start + word.len()]
                    .iter_mut()
                    .for_each(|c| *c = true);
            }
        }
        covered.into_iter().filter(|&c| c).count()
    }

    /// Share of letters covered by listed words, in [0, 1].
    pub fn hit_rate(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        self.coverage(text) as f64 / text.len() as f64
    }
}
