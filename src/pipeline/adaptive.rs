use crate::candidate::StageResult;
use crate::scorer::Scorer;
use serde::{Deserialize, Serialize};

/// Per-stage signals used to reweight a stage's candidates in fused selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveDiagnostics {
    pub median_wordlist_hit_rate: f64,
    /// Mean over finite candidate scores; 0.0 when there are none
    pub mean_score: f64,
    pub candidate_count: usize,
    /// Boost added to every candidate of the stage: `fusion_weight * median_wordlist_hit_rate`
    pub stage_weight: f64,
}

pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

pub fn diagnose(result: &StageResult, scorer: &Scorer, fusion_weight: f64) -> AdaptiveDiagnostics {
    let candidates = result.candidates();
    let mut rates: Vec<f64> = candidates
        .iter()
        .map(|c| scorer.wordlist_hit_rate(c.text()))
        .collect();
    let median_wordlist_hit_rate = median(&mut rates);

    let finite: Vec<f64> = candidates
        .iter()
        .map(|c| c.score())
        .filter(|s| s.is_finite())
        .collect();
    let mean_score = if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    };

    AdaptiveDiagnostics {
        median_wordlist_hit_rate,
        mean_score,
        candidate_count: candidates.len(),
        stage_weight: fusion_weight * median_wordlist_hit_rate,
    }
}

#[inline(always)]
pub fn fused_score(score: f64, diag: &AdaptiveDiagnostics) -> f64 {
    score + diag.stage_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&mut Vec::new()), 0.0);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
    }
}
