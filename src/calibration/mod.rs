pub mod spearman;

pub use self::spearman::spearman;

use crate::error::{CfResult, CipherForgeError};
use crate::scorer::Scorer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{info, warn};

pub const CALIBRATION_FILE: &str = "calibration_sweep.csv";

/// Which scoring weight a sweep rescales.
#[derive(
    Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    Rarity,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub text: String,
    #[serde(default)]
    pub label: Option<f64>,
}

impl Sample {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            label: None,
        }
    }

    pub fn labeled(text: &str, label: f64) -> Self {
        Self {
            text: text.to_string(),
            label: Some(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRow {
    pub weight: f64,
    pub spearman_vs_baseline: f64,
    pub mean_score: f64,
    pub score_spread: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepFailure {
    pub weight: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub rows: Vec<CalibrationRow>,
    pub failures: Vec<SweepFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Objective {
    #[default]
    MaxCorrelation,
    MaxAbsCorrelation,
}

/// One line of the calibration artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub sweep: SweepKind,
    pub weight: f64,
    pub spearman_vs_baseline: f64,
    pub mean_score: f64,
    pub score_spread: f64,
}

impl SweepRecord {
    pub fn row(&self) -> CalibrationRow {
        CalibrationRow {
            weight: self.weight,
            spearman_vs_baseline: self.spearman_vs_baseline,
            mean_score: self.mean_score,
            score_spread: self.score_spread,
        }
    }
}

/// Reads samples from CSV with a `text` column and an optional `label` column.
pub fn load_samples<P: AsRef<Path>>(path: P) -> CfResult<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut samples = Vec::new();
    for result in rdr.deserialize() {
        let sample: Sample = result?;
        samples.push(sample);
    }
    Ok(samples)
}

/// The reference ranking: labels when every sample has one, otherwise combined
/// scores under the scorer's current weights.
pub fn baseline_scores(samples: &[Sample], scorer: &Scorer) -> Vec<f64> {
    let labels: Option<Vec<f64>> = samples.iter().map(|s| s.label).collect();
    match labels {
        Some(l) if !l.is_empty() => l,
        _ => samples
            .iter()
            .map(|s| scorer.combined_score(&s.text))
            .collect(),
    }
}

fn evaluate_weight(
    kind: SweepKind,
    weight: f64,
    samples: &[Sample],
    baseline: &[f64],
    scorer: &Scorer,
) -> Result<CalibrationRow, SweepFailure> {
    let fail = |reason: String| SweepFailure { weight, reason };
    if !weight.is_finite() || weight < 0.0 {
        return Err(fail(format!("weight must be finite and >= 0, got {}", weight)));
    }

    let mut weights = scorer.weights.clone();
    match kind {
        SweepKind::Rarity => weights.weight_rarity = weight,
        SweepKind::Positional => weights.weight_positional = weight,
    }
    let local = scorer.with_weights(weights);

    let scores: Vec<f64> = samples
        .iter()
        .map(|s| local.combined_score(&s.text))
        .collect();
    if let Some(i) = scores.iter().position(|s| s.is_nan()) {
        return Err(fail(format!("sample {} scored NaN", i)));
    }

    let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    let (mean_score, score_spread) = if finite.is_empty() {
        (0.0, 0.0)
    } else {
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        (finite.iter().sum::<f64>() / finite.len() as f64, max - min)
    };

    Ok(CalibrationRow {
        weight,
        spearman_vs_baseline: spearman(&scores, baseline).clamp(-1.0, 1.0),
        mean_score,
        score_spread,
    })
}

/// Evaluates every weight in parallel. Bad weights are reported as failures; the
/// rest of the sweep still completes. Rows keep the order of `weights`.
pub fn sweep_weight(
    kind: SweepKind,
    samples: &[Sample],
    baseline: &[f64],
    weights: &[f64],
    scorer: &Scorer,
) -> CfResult<SweepOutcome> {
    if samples.len() < 2 {
        return Err(CipherForgeError::Validation(format!(
            "Calibration needs at least 2 samples, got {}",
            samples.len()
        )));
    }
    if baseline.len() != samples.len() {
        return Err(CipherForgeError::Validation(format!(
            "Baseline has {} scores for {} samples",
            baseline.len(),
            samples.len()
        )));
    }

    let results: Vec<Result<CalibrationRow, SweepFailure>> = weights
        .par_iter()
        .map(|&w| evaluate_weight(kind, w, samples, baseline, scorer))
        .collect();

    let mut outcome = SweepOutcome::default();
    for r in results {
        match r {
            Ok(row) => outcome.rows.push(row),
            Err(f) => {
                warn!("⚠️  {} sweep: weight {} failed: {}", kind, f.weight, f.reason);
                outcome.failures.push(f);
            }
        }
    }
    info!(
        "📈 {} sweep: {} rows, {} failures",
        kind,
        outcome.rows.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}

pub fn sweep_rarity_weight(
    samples: &[Sample],
    baseline: &[f64],
    weights: &[f64],
    scorer: &Scorer,
) -> CfResult<SweepOutcome> {
    sweep_weight(SweepKind::Rarity, samples, baseline, weights, scorer)
}

pub fn sweep_positional_weight(
    samples: &[Sample],
    baseline: &[f64],
    weights: &[f64],
    scorer: &Scorer,
) -> CfResult<SweepOutcome> {
    sweep_weight(SweepKind::Positional, samples, baseline, weights, scorer)
}

/// Weight of the row that best meets `objective`. The first row wins ties.
pub fn pick_best_weight_from_rows(rows: &[CalibrationRow], objective: Objective) -> Option<f64> {
    let metric = |r: &CalibrationRow| match objective {
        Objective::MaxCorrelation => r.spearman_vs_baseline,
        Objective::MaxAbsCorrelation => r.spearman_vs_baseline.abs(),
    };
    let mut best: Option<&CalibrationRow> = None;
    for row in rows {
        if best.map_or(true, |b| metric(row) > metric(b)) {
            best = Some(row);
        }
    }
    best.map(|r| r.weight)
}

/// Writes both sweeps to `<dir>/calibration_sweep.csv`, creating `dir` if absent.
pub fn write_calibration_artifact(
    dir: &Path,
    rarity_rows: &[CalibrationRow],
    positional_rows: &[CalibrationRow],
) -> CfResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(CALIBRATION_FILE);
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record([
        "sweep",
        "weight",
        "spearman_vs_baseline",
        "mean_score",
        "score_spread",
    ])?;
    let tagged = rarity_rows
        .iter()
        .map(|r| (SweepKind::Rarity, r))
        .chain(positional_rows.iter().map(|r| (SweepKind::Positional, r)));
    for (kind, r) in tagged {
        wtr.write_record(&[
            kind.to_string(),
            r.weight.to_string(),
            r.spearman_vs_baseline.to_string(),
            r.mean_score.to_string(),
            r.score_spread.to_string(),
        ])?;
    }
    wtr.flush()?;
    info!("💾 Calibration rows written to {}", path.display());
    Ok(path)
}

pub fn read_calibration_artifact<P: AsRef<Path>>(path: P) -> CfResult<Vec<SweepRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: SweepRecord = result?;
        records.push(record);
    }
    Ok(records)
}
