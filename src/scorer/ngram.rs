use crate::alphabet::{letter_index, normalize};
use crate::consts::{ALPHABET_LEN, NGRAM_FLOOR_MASS};

/// Largest n-gram order the dense tables support (26^4 cells).
pub const MAX_ORDER: usize = 4;

/// Dense log10-probability table for one n-gram order.
#[derive(Debug, Clone)]
pub struct NgramTable {
    n: usize,
    log_probs: Vec<f32>,
    floor: f64,
    entries: usize,
}

impl NgramTable {
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            log_probs: Vec::new(),
            floor: 0.0,
            entries: 0,
        }
    }

    /// Builds a table from `(token, weight)` pairs. Tokens of the wrong length, and
    /// non-positive or non-finite weights, are ignored.
    pub fn from_counts<I, S>(n: usize, counts: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        if n == 0 || n > MAX_ORDER {
            return Self::empty(n);
        }

        let size = ALPHABET_LEN.pow(n as u32);
        let mut raw = vec![0.0f64; size];
        let mut total = 0.0;

        for (token, weight) in counts {
            if !weight.is_finite() || weight <= 0.0 {
                continue;
            }
            let token = normalize(token.as_ref());
            if token.len() != n {
                continue;
            }
            if let Some(idx) = index_of(token.as_bytes()) {
                raw[idx] += weight;
                total += weight;
            }
        }

        if total <= 0.0 {
            return Self::empty(n);
        }

        // Rounded through f32 so stored and returned floors agree
        let floor = (NGRAM_FLOOR_MASS / total).log10() as f32 as f64;
        let mut entries = 0;
        let log_probs = raw
            .into_iter()
            .map(|c| {
                if c > 0.0 {
                    entries += 1;
                    (c / total).log10() as f32
                } else {
                    floor as f32
                }
            })
            .collect();

        Self {
            n,
            log_probs,
            floor,
            entries,
        }
    }

    /// Counts every overlapping n-gram of the normalized corpus.
    pub fn from_corpus(n: usize, corpus: &str) -> Self {
        let text = normalize(corpus);
        let bytes = text.as_bytes();
        if n == 0 || bytes.len() < n {
            return Self::empty(n);
        }
        let grams = bytes
            .windows(n)
            .map(|w| (String::from_utf8_lossy(w).into_owned(), 1.0));
        Self::from_counts(n, grams)
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of distinct n-grams observed.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    #[inline(always)]
    pub fn log_prob(&self, gram: &[u8]) -> f64 {
        if self.is_empty() || gram.len() != self.n {
            return 0.0;
        }
        match index_of(gram) {
            Some(idx) => self.log_probs[idx] as f64,
            None => self.floor,
        }
    }

    /// Mean log10 probability per n-gram. Empty text, text shorter than `n`,
    /// or an empty table all give 0.0.
    pub fn score(&self, text: &[u8]) -> f64 {
        if self.is_empty() || text.len() < self.n {
            return 0.0;
        }
        let mut sum = 0.0;
        let mut count = 0usize;
        for w in text.windows(self.n) {
            if let Some(idx) = index_of(w) {
                sum += self.log_probs[idx] as f64;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

#[inline(always)]
fn index_of(gram: &[u8]) -> Option<usize> {
    let mut idx = 0usize;
    for &b in gram {
        idx = idx * ALPHABET_LEN + letter_index(b)?;
    }
    Some(idx)
}
