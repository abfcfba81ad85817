//! Keyed-alphabet periodic key recovery.
//!
//! The ciphertext is split into `key_len` columns (position mod `key_len`). Every
//! symbol of the keyed alphabet is tried against every column and ranked by English
//! monogram fitness. Full keys are then assembled by a bounded beam search over the
//! per-column rankings. This is a local search: the true key is only reachable when
//! each column's true symbol ranks within `top_n`.

use crate::alphabet::{normalize, KeyedAlphabet};
use crate::consts::{ALPHABET_LEN, ENGLISH_MONOGRAM_FREQS};
use crate::error::{CfResult, CipherForgeError};
use crate::scorer::dictionary::Wordlist;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecoveryOptions {
    /// Symbols per column that enter the beam
    pub top_n: usize,
    pub beam_width: usize,
    pub max_keys: usize,
    pub use_dictionary: bool,
    pub dictionary_weight: f64,
}

impl Default for KeyRecoveryOptions {
    fn default() -> Self {
        Self {
            top_n: 3,
            beam_width: 256,
            max_keys: 50,
            use_dictionary: false,
            dictionary_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveredKey {
    pub key: String,
    pub plaintext: String,
    /// Sum of the per-column fitness values
    pub column_score: f64,
    pub dictionary_hits: usize,
    /// `column_score`, plus the weighted dictionary coverage when enabled
    pub rank_score: f64,
}

#[derive(Debug, Clone)]
pub struct KeyRecovery {
    pub key_len: usize,
    /// Per column: alphabet symbols with their fitness, best first
    pub rankings: Vec<Vec<(u8, f64)>>,
    pub keys: Vec<RecoveredKey>,
}

impl KeyRecovery {
    /// 1-based rank of `key` among the recovered keys.
    pub fn rank_of(&self, key: &str) -> Option<usize> {
        let key = normalize(key);
        self.keys.iter().position(|k| k.key == key).map(|i| i + 1)
    }
}

/// English monogram log-likelihood of a run of letters.
pub fn column_fitness(letters: &[u8]) -> f64 {
    let mut log_freqs = [0.0f64; ALPHABET_LEN];
    for (slot, f) in log_freqs.iter_mut().zip(ENGLISH_MONOGRAM_FREQS.iter()) {
        *slot = (f / 100.0).ln();
    }
    letters
        .iter()
        .filter(|b| b.is_ascii_uppercase())
        .map(|&b| log_freqs[(b - b'A') as usize])
        .sum()
}

pub fn split_columns(letters: &[u8], key_len: usize) -> Vec<Vec<u8>> {
    let mut cols = vec![Vec::with_capacity(letters.len() / key_len.max(1) + 1); key_len];
    for (i, &b) in letters.iter().enumerate() {
        cols[i % key_len].push(b);
    }
    cols
}

/// Every alphabet symbol as a key for this column, best fitness first. Ties keep
/// alphabet order.
pub fn rank_column_symbols(column: &[u8], alphabet: &KeyedAlphabet) -> Vec<(u8, f64)> {
    let mut scratch = Vec::with_capacity(column.len());
    let mut ranked: Vec<(u8, f64)> = alphabet
        .symbols()
        .iter()
        .map(|&k| {
            scratch.clear();
            scratch.extend(column.iter().map(|&c| alphabet.decrypt_letter(c, k)));
            (k, column_fitness(&scratch))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

pub fn recover_keys(
    ciphertext: &str,
    key_len: usize,
    alphabet: &KeyedAlphabet,
    opts: &KeyRecoveryOptions,
    wordlist: Option<&Wordlist>,
) -> CfResult<KeyRecovery> {
    if key_len == 0 {
        return Err(CipherForgeError::InputShape(
            "Key length must be at least 1".to_string(),
        ));
    }
    let text = normalize(ciphertext);
    let letters = text.as_bytes();
    if letters.len() < key_len {
        return Err(CipherForgeError::InputShape(format!(
            "Ciphertext has {} letters, too short for key length {}",
            letters.len(),
            key_len
        )));
    }

    // 1. Per-column rankings
    let rankings: Vec<Vec<(u8, f64)>> = split_columns(letters, key_len)
        .iter()
        .map(|col| rank_column_symbols(col, alphabet))
        .collect();

    // 2. Beam over the top_n symbols of each column
    let top = opts.top_n.clamp(1, ALPHABET_LEN);
    let width = opts.beam_width.max(1);
    let mut beam: Vec<(f64, Vec<u8>)> = vec![(0.0, Vec::with_capacity(key_len))];
    for ranking in &rankings {
        let mut next = Vec::with_capacity(beam.len() * top);
        for (score, key) in &beam {
            for &(sym, s) in ranking.iter().take(top) {
                let mut k = key.clone();
                k.push(sym);
                next.push((score + s, k));
            }
        }
        next.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        next.truncate(width);
        beam = next;
    }
    beam.truncate(opts.max_keys.max(1));

    // 3. Decrypt, optionally re-rank against the dictionary
    let mut keys: Vec<RecoveredKey> = beam
        .into_iter()
        .map(|(column_score, key)| {
            let plain: Vec<u8> = letters
                .iter()
                .enumerate()
                .map(|(i, &c)| alphabet.decrypt_letter(c, key[i % key_len]))
                .collect();
            let plaintext = String::from_utf8_lossy(&plain).into_owned();
            let dictionary_hits = match (opts.use_dictionary, wordlist) {
                (true, Some(words)) => words.coverage(&plaintext),
                _ => 0,
            };
            RecoveredKey {
                key: String::from_utf8_lossy(&key).into_owned(),
                plaintext,
                column_score,
                dictionary_hits,
                rank_score: column_score + opts.dictionary_weight * dictionary_hits as f64,
            }
        })
        .collect();

    if opts.use_dictionary {
        keys.sort_by(|a, b| {
            b.rank_score
                .total_cmp(&a.rank_score)
                .then_with(|| b.column_score.total_cmp(&a.column_score))
                .then_with(|| a.key.cmp(&b.key))
        });
    }

    debug!(
        "Key length {}: {} keys assembled (top_n={}, beam={})",
        key_len,
        keys.len(),
        top,
        width
    );

    Ok(KeyRecovery {
        key_len,
        rankings,
        keys,
    })
}
