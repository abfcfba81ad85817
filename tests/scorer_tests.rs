mod common;

use cipherforge::alphabet::normalize;
use cipherforge::config::ScoringWeights;
use cipherforge::scorer::positional::positional_letter_deviation;
use cipherforge::scorer::{letter_coverage, BaselineStats, LanguageModelBuilder, Scorer};
use common::{empty_scorer, english_model, english_scorer, plaintext_slice, shuffled};
use rstest::rstest;
use std::sync::Arc;

// --- EMPTY INPUT SENTINELS ---
#[test]
fn test_empty_text_components() {
    let scorer = english_scorer();
    assert_eq!(scorer.combined_score(""), f64::NEG_INFINITY);
    assert_eq!(scorer.bigram_score(""), 0.0);
    assert_eq!(scorer.trigram_score(""), 0.0);
    assert_eq!(scorer.quadgram_score(""), 0.0);
    assert_eq!(letter_coverage(""), 0.0);
    assert_eq!(scorer.rarity_weighted_crib_bonus(""), 0.0);
    assert_eq!(scorer.positional_score(""), 0.0);
}

#[test]
fn test_baseline_stats_empty_is_all_zero() {
    let scorer = english_scorer();
    let stats = scorer.baseline_stats("");
    assert_eq!(stats, BaselineStats::default());
    assert!(stats.as_map().values().all(|&v| v == 0.0));
    assert_eq!(stats.as_map().len(), 9);
}

#[test]
fn test_missing_tables_score_zero() {
    let scorer = empty_scorer();
    let text = "THERIVERRANSLOWLY";
    assert_eq!(scorer.bigram_score(text), 0.0);
    assert_eq!(scorer.trigram_score(text), 0.0);
    assert_eq!(scorer.quadgram_score(text), 0.0);
    assert!(scorer.combined_score(text).is_finite());
}

#[rstest]
#[case("A", 2)]
#[case("AB", 3)]
#[case("ABC", 4)]
fn test_text_shorter_than_order_scores_zero(#[case] text: &str, #[case] order: usize) {
    let scorer = english_scorer();
    let score = match order {
        2 => scorer.bigram_score(text),
        3 => scorer.trigram_score(text),
        _ => scorer.quadgram_score(text),
    };
    assert_eq!(score, 0.0);
}

// --- N-GRAM LIKELIHOOD ---
#[test]
fn test_english_beats_shuffled_ngrams() {
    let scorer = english_scorer();
    let english = plaintext_slice(300, 200);
    let noise = shuffled(&english, 11);
    assert!(scorer.quadgram_score(&english) > scorer.quadgram_score(&noise));
    assert!(scorer.combined_score(&english) > scorer.combined_score(&noise));
}

#[test]
fn test_ngram_scores_are_non_positive_means() {
    let scorer = english_scorer();
    let english = plaintext_slice(0, 120);
    for s in [
        scorer.bigram_score(&english),
        scorer.trigram_score(&english),
        scorer.quadgram_score(&english),
    ] {
        assert!(s < 0.0 && s.is_finite(), "got {}", s);
    }
}

// --- CRIBS ---
#[test]
fn test_crib_bonus_counts_letters_of_present_cribs() {
    let scorer = english_scorer();
    // RIVER (5) + CLOCK (5); NORTH absent
    assert_eq!(scorer.crib_bonus("THERIVERANDTHECLOCK"), 10.0);
    assert_eq!(scorer.crib_bonus("NOTHINGHERE"), 0.0);
}

#[test]
fn test_rarity_weight_favours_rare_cribs() {
    let model = LanguageModelBuilder::new()
        .with_cribs(vec![
            cipherforge::scorer::cribs::Crib::new("BERLIN", 1.0),
            cipherforge::scorer::cribs::Crib::new("THEEND", 100.0),
        ])
        .build();
    let scorer = Scorer::new(Arc::new(model), ScoringWeights::default());
    let rare = scorer.rarity_weighted_crib_bonus("XXBERLINXX");
    let common = scorer.rarity_weighted_crib_bonus("XXTHEENDXX");
    assert!(rare > common);
    assert!(common >= 0.0);
    // Same length, so the plain crib bonus cannot tell them apart
    assert_eq!(scorer.crib_bonus("XXBERLINXX"), scorer.crib_bonus("XXTHEENDXX"));
}

// --- POSITIONAL DEVIATION ---
#[rstest]
#[case(0)]
#[case(500)]
#[case(1200)]
fn test_positional_english_beats_fixed_shuffle(#[case] offset: usize) {
    let scorer = english_scorer();
    let english = plaintext_slice(offset, 320);
    let noise = shuffled(&english, 7);
    let (e, n) = (scorer.positional_score(&english), scorer.positional_score(&noise));
    assert!((0.0..=1.0).contains(&e) && (0.0..=1.0).contains(&n));
    assert!(e > n, "english {} vs shuffled {}", e, n);
}

#[test]
fn test_positional_period_is_clamped() {
    let model = english_model();
    let text = plaintext_slice(0, 200);
    let wide = Scorer::new(
        model.clone(),
        ScoringWeights {
            positional_period: 99,
            ..Default::default()
        },
    );
    let six = Scorer::new(
        model,
        ScoringWeights {
            positional_period: 6,
            ..Default::default()
        },
    );
    assert_eq!(wide.positional_score(&text), six.positional_score(&text));
}

#[test]
fn test_positional_period_bounds_window_width() {
    let text = plaintext_slice(300, 181);
    let reversed: String = text.chars().rev().collect();
    for period in 2..=6 {
        // Windows carry no phase, so a reversed text has the same vowel histograms
        assert_eq!(
            positional_letter_deviation(text.as_bytes(), period),
            positional_letter_deviation(reversed.as_bytes(), period)
        );
    }
    assert_eq!(
        positional_letter_deviation(text.as_bytes(), 1),
        positional_letter_deviation(text.as_bytes(), 2)
    );
    assert_ne!(
        positional_letter_deviation(text.as_bytes(), 2),
        positional_letter_deviation(text.as_bytes(), 6)
    );
}

// --- COVERAGE & WORDLIST ---
#[test]
fn test_letter_coverage() {
    assert_eq!(letter_coverage("ABCABC"), 3.0 / 26.0);
    assert_eq!(
        letter_coverage(&normalize("The quick brown fox jumps over the lazy dog")),
        1.0
    );
}

#[test]
fn test_wordlist_hit_rate() {
    let scorer = english_scorer();
    assert_eq!(scorer.wordlist_hit_rate(""), 0.0);
    let english = scorer.wordlist_hit_rate("THERIVERANDTHEWATER");
    let noise = scorer.wordlist_hit_rate("QZXJKVQZXJKVQZXJKV");
    assert!(english > 0.5, "got {}", english);
    assert_eq!(noise, 0.0);
}

// --- WEIGHTS ---
#[test]
fn test_with_weights_does_not_leak() {
    let base = english_scorer();
    let text = "THECLOCKSTRUCKSIXBYTHERIVER";
    let before = base.combined_score(text);
    let heavy = base.with_weights(ScoringWeights {
        weight_crib: 100.0,
        ..base.weights.clone()
    });
    assert!(heavy.combined_score(text) > before);
    assert_eq!(base.combined_score(text), before);
    assert!(Arc::ptr_eq(&base.model, &heavy.model));
}

#[test]
fn test_combined_matches_baseline_stats() {
    let scorer = english_scorer();
    let text = plaintext_slice(100, 150);
    let stats = scorer.baseline_stats(&text);
    assert!((stats.combined - scorer.combined_score(&text)).abs() < 1e-9);
}
