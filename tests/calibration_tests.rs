mod common;

use cipherforge::calibration::{
    baseline_scores, load_samples, pick_best_weight_from_rows, read_calibration_artifact,
    sweep_positional_weight, sweep_rarity_weight, write_calibration_artifact, CalibrationRow,
    Objective, Sample, SweepKind, CALIBRATION_FILE,
};
use cipherforge::error::CipherForgeError;
use common::{english_scorer, plaintext_slice, shuffled};
use std::io::Write;
use tempfile::tempdir;

fn samples() -> Vec<Sample> {
    let mut out = Vec::new();
    for i in 0..4 {
        let english = plaintext_slice(i * 300, 120);
        out.push(Sample::new(&shuffled(&english, i as u64 + 1)));
        out.push(Sample::new(&english));
    }
    out
}

fn row(weight: f64, rho: f64) -> CalibrationRow {
    CalibrationRow {
        weight,
        spearman_vs_baseline: rho,
        mean_score: 0.0,
        score_spread: 0.0,
    }
}

// --- SWEEPS ---
#[test]
fn test_sweep_rows_stay_in_range_and_order() {
    let scorer = english_scorer();
    let samples = samples();
    let baseline = baseline_scores(&samples, &scorer);
    let weights = [0.0, 0.5, 1.0, 5.0, 20.0];

    let out = sweep_positional_weight(&samples, &baseline, &weights, &scorer).unwrap();
    assert!(out.failures.is_empty());
    let swept: Vec<f64> = out.rows.iter().map(|r| r.weight).collect();
    assert_eq!(swept, weights.to_vec());
    for r in &out.rows {
        assert!((-1.0..=1.0).contains(&r.spearman_vs_baseline));
        assert!(r.score_spread >= 0.0);
    }
}

#[test]
fn test_current_weight_reproduces_baseline_ranking() {
    let scorer = english_scorer();
    let samples = samples();
    let baseline = baseline_scores(&samples, &scorer);
    let current = scorer.weights.weight_rarity;

    let out = sweep_rarity_weight(&samples, &baseline, &[current], &scorer).unwrap();
    assert!((out.rows[0].spearman_vs_baseline - 1.0).abs() < 1e-12);
}

#[test]
fn test_labels_are_the_baseline_when_complete() {
    let scorer = english_scorer();
    let labeled = vec![Sample::labeled("AAAA", 3.0), Sample::labeled("BBBB", 1.0)];
    assert_eq!(baseline_scores(&labeled, &scorer), vec![3.0, 1.0]);

    let partial = vec![Sample::labeled("AAAA", 3.0), Sample::new("BBBB")];
    let baseline = baseline_scores(&partial, &scorer);
    assert_eq!(baseline[1], scorer.combined_score("BBBB"));
}

#[test]
fn test_bad_weights_become_failures() {
    let scorer = english_scorer();
    let samples = samples();
    let baseline = baseline_scores(&samples, &scorer);

    let out =
        sweep_rarity_weight(&samples, &baseline, &[1.0, -2.0, f64::NAN, 3.0], &scorer).unwrap();
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.failures.len(), 2);
    assert_eq!(out.failures[0].weight, -2.0);
    assert!(out.failures[1].weight.is_nan());
}

#[test]
fn test_too_few_samples_is_validation_error() {
    let scorer = english_scorer();
    let one = vec![Sample::new("THERIVER")];
    let err = sweep_rarity_weight(&one, &[1.0], &[1.0], &scorer).unwrap_err();
    assert!(matches!(err, CipherForgeError::Validation(_)));

    let two = samples();
    let err = sweep_rarity_weight(&two, &[1.0, 2.0], &[1.0], &scorer).unwrap_err();
    assert!(matches!(err, CipherForgeError::Validation(_)));
}

// --- PICKING ---
#[test]
fn test_pick_best_weight() {
    let rows = vec![row(0.0, 0.2), row(1.0, 0.9), row(2.0, 0.9), row(3.0, -0.95)];
    assert_eq!(pick_best_weight_from_rows(&rows, Objective::MaxCorrelation), Some(1.0));
    assert_eq!(pick_best_weight_from_rows(&rows, Objective::MaxAbsCorrelation), Some(3.0));
    assert_eq!(pick_best_weight_from_rows(&[], Objective::default()), None);
}

// --- ARTIFACTS ---
#[test]
fn test_artifact_round_trip() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("calibration");
    let rarity = vec![row(0.0, 0.5), row(1.0, 0.75)];
    let positional = vec![row(2.5, -0.25)];

    let path = write_calibration_artifact(&out_dir, &rarity, &positional).unwrap();
    assert_eq!(path, out_dir.join(CALIBRATION_FILE));

    let records = read_calibration_artifact(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].sweep, SweepKind::Rarity);
    assert_eq!(records[2].sweep, SweepKind::Positional);
    assert_eq!(records[1].row(), rarity[1]);
    assert_eq!(records[2].row(), positional[0]);
}

#[test]
fn test_load_samples_with_optional_labels() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "text,label").unwrap();
    writeln!(file, "the river ran slowly, 2.5").unwrap();
    writeln!(file, "XQZJ,").unwrap();
    let samples = load_samples(file.path()).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].label, Some(2.5));
    assert_eq!(samples[0].text, "the river ran slowly");
    assert_eq!(samples[1].label, None);
}
