use crate::candidate::{by_score_desc, Candidate};
use crate::config::PruneParams;
use tracing::debug;

/// Bounds a candidate population while keeping crib-bearing outliers.
///
/// Candidates are stable-sorted by score, the first `top_n` are kept, and any other
/// candidate with `crib_bonus >= crib_bonus_threshold` is kept as well. When the total
/// exceeds `candidate_cap`, the lowest-scored bonus survivors go first, then the tail of
/// the top-n block. Survivors come back in score order.
pub fn prune_candidates(
    candidates: &[Candidate],
    top_n: usize,
    candidate_cap: usize,
    crib_bonus_threshold: f64,
) -> Vec<Candidate> {
    let mut order: Vec<&Candidate> = candidates.iter().collect();
    order.sort_by(|a, b| by_score_desc(a, b));

    let head = top_n.min(order.len());
    let mut keep: Vec<bool> = vec![false; order.len()];
    keep[..head].iter_mut().for_each(|k| *k = true);

    // Bonus survivors, in score order
    let mut rescued: Vec<usize> = (head..order.len())
        .filter(|&i| order[i].crib_bonus() >= crib_bonus_threshold)
        .collect();

    let mut kept_head = head;
    while kept_head + rescued.len() > candidate_cap {
        if rescued.pop().is_none() {
            break;
        }
    }
    while kept_head + rescued.len() > candidate_cap && kept_head > 0 {
        kept_head -= 1;
        keep[kept_head] = false;
    }
    for &i in &rescued {
        keep[i] = true;
    }

    let survivors: Vec<Candidate> = order
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(c, _)| c.clone())
        .collect();

    debug!(
        "Pruned {} -> {} (top_n={}, cap={}, rescued={})",
        candidates.len(),
        survivors.len(),
        top_n,
        candidate_cap,
        rescued.len()
    );
    survivors
}

impl PruneParams {
    pub fn apply(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        prune_candidates(
            candidates,
            self.prune_top_n,
            self.candidate_cap,
            self.crib_bonus_threshold,
        )
    }
}
