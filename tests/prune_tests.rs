use cipherforge::candidate::{Candidate, Meta};
use cipherforge::config::PruneParams;
use cipherforge::prune::prune_candidates;
use rstest::rstest;
use serde_json::Value;

fn cand(text: &str, score: f64, bonus: f64) -> Candidate {
    let mut meta = Meta::new();
    meta.insert("crib_bonus".to_string(), Value::from(bonus));
    Candidate::new(text.to_string(), score, meta)
}

fn texts(cands: &[Candidate]) -> Vec<&str> {
    cands.iter().map(|c| c.text()).collect()
}

#[test]
fn test_bonus_candidate_survives_low_score() {
    let input = vec![
        cand("A100", 100.0, 0.0),
        cand("B90", 90.0, 0.0),
        cand("C10", 10.0, 6.0),
        cand("D80", 80.0, 0.0),
    ];
    let out = prune_candidates(&input, 2, 6, 5.0);
    assert_eq!(texts(&out), vec!["A100", "B90", "C10"]);
}

#[test]
fn test_cap_bounds_result() {
    let input: Vec<Candidate> = (0..10)
        .map(|i| cand(&format!("T{}", i), i as f64, if i % 2 == 0 { 9.0 } else { 0.0 }))
        .collect();
    let out = prune_candidates(&input, 3, 4, 5.0);
    assert!(out.len() <= 4);
}

#[test]
fn test_cap_drops_lowest_bonus_survivors_first() {
    let input = vec![
        cand("TOP1", 50.0, 0.0),
        cand("TOP2", 40.0, 0.0),
        cand("BONUS_HIGH", 30.0, 8.0),
        cand("PLAIN", 20.0, 0.0),
        cand("BONUS_LOW", 10.0, 8.0),
    ];
    let out = prune_candidates(&input, 2, 3, 5.0);
    assert_eq!(texts(&out), vec!["TOP1", "TOP2", "BONUS_HIGH"]);
}

#[test]
fn test_cap_below_top_n_trims_top_block() {
    let input: Vec<Candidate> = (0..6).map(|i| cand(&format!("T{}", i), i as f64, 0.0)).collect();
    let out = prune_candidates(&input, 5, 2, 5.0);
    assert_eq!(texts(&out), vec!["T5", "T4"]);
}

#[test]
fn test_stable_for_equal_scores() {
    let input = vec![
        cand("FIRST", 1.0, 0.0),
        cand("SECOND", 1.0, 0.0),
        cand("THIRD", 1.0, 0.0),
    ];
    let out = prune_candidates(&input, 2, 10, 5.0);
    assert_eq!(texts(&out), vec!["FIRST", "SECOND"]);
}

#[test]
fn test_neg_infinity_sorts_last() {
    let input = vec![
        cand("EMPTY", f64::NEG_INFINITY, 0.0),
        cand("REAL", -3.0, 0.0),
    ];
    let out = prune_candidates(&input, 1, 10, 5.0);
    assert_eq!(texts(&out), vec!["REAL"]);
}

#[rstest]
#[case(0, 0)]
#[case(3, 0)]
#[case(0, 5)]
fn test_degenerate_budgets(#[case] top_n: usize, #[case] cap: usize) {
    let input: Vec<Candidate> = (0..4).map(|i| cand(&format!("T{}", i), i as f64, 0.0)).collect();
    let out = prune_candidates(&input, top_n, cap, 5.0);
    assert!(out.len() <= cap.min(top_n));
}

#[test]
fn test_prune_params_apply() {
    let params = PruneParams {
        prune_top_n: 1,
        candidate_cap: 2,
        crib_bonus_threshold: 1.0,
    };
    let input = vec![cand("X", 3.0, 0.0), cand("Y", 2.0, 2.0), cand("Z", 1.0, 2.0)];
    assert_eq!(texts(&params.apply(&input)), vec!["X", "Y"]);
}
