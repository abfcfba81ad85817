use super::transposition::{
    decrypt_letters, positional_crib_bonus, route_cells, PositionalCribs, Route,
};
use crate::alphabet::normalize;
use crate::candidate::{sort_by_score, Candidate, Meta};
use crate::error::{CfResult, CipherForgeError};
use crate::scorer::Scorer;
use fastrand::Rng;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RefineOptions {
    pub n_cols: usize,
    pub route: Route,
    pub restarts: usize,
    pub steps: usize,
    /// Prefix length checked before full scoring when `prune` is set
    pub partial_len: usize,
    /// Minimum mean quadgram log-probability the prefix must reach
    pub partial_min: f64,
    pub prune: bool,
    pub seed: u64,
    pub window: usize,
    pub bonus_per_letter: f64,
    pub limit: usize,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            n_cols: 8,
            route: Route::Rows,
            restarts: 8,
            steps: 500,
            partial_len: 24,
            partial_min: -6.0,
            prune: false,
            seed: 42,
            window: 2,
            bonus_per_letter: 3.0,
            limit: 50,
        }
    }
}

struct Climber<'a> {
    letters: &'a [u8],
    cells: Vec<usize>,
    cribs: &'a PositionalCribs,
    opts: &'a RefineOptions,
    scorer: &'a Scorer,
    rejected_early: usize,
}

impl Climber<'_> {
    /// Full score of an order, or `None` when the partial check rejects it.
    fn evaluate(&mut self, order: &[usize], allow_prune: bool) -> Option<(f64, String)> {
        let plain = decrypt_letters(self.letters, order, &self.cells);
        let opts = self.opts;
        if allow_prune && opts.prune && opts.partial_len > 0 && plain.len() >= opts.partial_len {
            let partial = self.scorer.quadgram_score(&plain[..opts.partial_len]);
            if partial < opts.partial_min {
                self.rejected_early += 1;
                return None;
            }
        }
        let bonus = positional_crib_bonus(&plain, self.cribs, opts.window, opts.bonus_per_letter);
        Some((self.scorer.combined_score(&plain) + bonus, plain))
    }
}

/// Seeded column-order hill climb for geometries too wide to enumerate.
///
/// Each restart shuffles a fresh order and then proposes `steps` random column swaps,
/// accepting only strict improvements. One candidate per restart, best first.
pub fn hill_climb_columnar(
    ciphertext: &str,
    cribs: &PositionalCribs,
    opts: &RefineOptions,
    scorer: &Scorer,
) -> CfResult<Vec<Candidate>> {
    let text = normalize(ciphertext);
    let n_cols = opts.n_cols;
    if n_cols < 2 || text.len() < 2 * n_cols {
        return Err(CipherForgeError::InputShape(format!(
            "Hill climb needs >= 2 columns and 2 letters per column ({} letters, {} columns)",
            text.len(),
            n_cols
        )));
    }
    let cribs: PositionalCribs = cribs
        .iter()
        .map(|(k, v)| (normalize(k), v.clone()))
        .filter(|(k, _)| !k.is_empty())
        .collect();

    let mut climber = Climber {
        letters: text.as_bytes(),
        cells: route_cells(text.len(), n_cols, opts.route),
        cribs: &cribs,
        opts,
        scorer,
        rejected_early: 0,
    };
    let mut rng = Rng::with_seed(opts.seed);
    let mut results = Vec::with_capacity(opts.restarts);
    let mut seen = HashSet::new();

    for restart in 0..opts.restarts.max(1) {
        let mut order: Vec<usize> = (0..n_cols).collect();
        rng.shuffle(&mut order);
        // The starting point is always scored in full.
        let Some((mut best, mut best_plain)) = climber.evaluate(&order, false) else {
            continue;
        };

        for _ in 0..opts.steps {
            let i = rng.usize(..n_cols);
            let j = rng.usize(..n_cols);
            if i == j {
                continue;
            }
            order.swap(i, j);
            match climber.evaluate(&order, true) {
                Some((score, plain)) if score > best => {
                    best = score;
                    best_plain = plain;
                }
                _ => order.swap(i, j),
            }
        }

        if !seen.insert(best_plain.clone()) {
            continue;
        }
        let pos_bonus =
            positional_crib_bonus(&best_plain, &cribs, opts.window, opts.bonus_per_letter);
        let mut meta = Meta::new();
        meta.insert("n_cols".to_string(), Value::from(n_cols));
        meta.insert("order".to_string(), Value::from(order.clone()));
        meta.insert("route".to_string(), Value::from(opts.route.to_string()));
        meta.insert("restart".to_string(), Value::from(restart));
        meta.insert("pos_bonus".to_string(), Value::from(pos_bonus));
        results.push(Candidate::scored(best_plain, scorer, pos_bonus, meta));
    }

    sort_by_score(&mut results);
    results.truncate(opts.limit);
    debug!(
        "Hill climb {} cols: {} restarts, {} proposals rejected early",
        n_cols, opts.restarts, climber.rejected_early
    );
    Ok(results)
}
