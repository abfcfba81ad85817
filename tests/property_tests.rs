mod common;

use cipherforge::calibration::spearman;
use cipherforge::candidate::{Candidate, Meta};
use cipherforge::prune::prune_candidates;
use cipherforge::scorer::Scorer;
use cipherforge::search::transposition::{decrypt_columnar, encrypt_columnar, Route};
use proptest::prelude::*;
use serde_json::Value;
use std::sync::OnceLock;

fn scorer() -> &'static Scorer {
    static SCORER: OnceLock<Scorer> = OnceLock::new();
    SCORER.get_or_init(common::english_scorer)
}

fn route_strategy() -> impl Strategy<Value = Route> {
    prop_oneof![Just(Route::Rows), Just(Route::Serpentine), Just(Route::Spiral)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_positional_score_is_bounded(text in "[A-Z]{0,200}") {
        let p = scorer().positional_score(&text);
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_rarity_bonus_is_non_negative(text in "[A-Z]{0,120}") {
        prop_assert!(scorer().rarity_weighted_crib_bonus(&text) >= 0.0);
    }

    #[test]
    fn test_combined_score_is_finite_or_empty(text in "[a-zA-Z ,.]{0,80}") {
        let norm = cipherforge::alphabet::normalize(&text);
        let s = scorer().combined_score(&norm);
        if norm.is_empty() {
            prop_assert_eq!(s, f64::NEG_INFINITY);
        } else {
            prop_assert!(s.is_finite());
        }
    }

    #[test]
    fn test_spearman_is_bounded(
        pairs in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 0..40)
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let rho = spearman(&a, &b);
        prop_assert!((-1.0..=1.0).contains(&rho));
    }

    #[test]
    fn test_prune_never_exceeds_cap(
        scores in prop::collection::vec((-100.0f64..100.0, 0.0f64..10.0), 0..60),
        top_n in 0usize..20,
        cap in 0usize..30,
    ) {
        let cands: Vec<Candidate> = scores
            .iter()
            .enumerate()
            .map(|(i, &(s, b))| {
                let mut meta = Meta::new();
                meta.insert("crib_bonus".to_string(), Value::from(b));
                Candidate::new(format!("C{}", i), s, meta)
            })
            .collect();
        let out = prune_candidates(&cands, top_n, cap, 5.0);
        prop_assert!(out.len() <= cap);
        prop_assert!(out.len() <= cands.len());
    }

    #[test]
    fn test_columnar_round_trip(
        text in "[A-Z]{12,90}",
        n_cols in 2usize..7,
        route in route_strategy(),
        seed in any::<u64>(),
    ) {
        let mut order: Vec<usize> = (0..n_cols).collect();
        fastrand::Rng::with_seed(seed).shuffle(&mut order);
        let ct = encrypt_columnar(&text, &order, route).unwrap();
        prop_assert_eq!(ct.len(), text.len());
        prop_assert_eq!(decrypt_columnar(&ct, &order, route).unwrap(), text);
    }
}
