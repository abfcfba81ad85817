pub mod adaptive;
pub mod artifacts;
pub mod attempts;

pub use self::adaptive::AdaptiveDiagnostics;
pub use self::artifacts::ArtifactPaths;
pub use self::attempts::{fingerprint, AttemptKey, AttemptLog, AttemptRecord};

use crate::candidate::{score_value, Candidate, Meta, StageResult};
use crate::config::{Config, PruneParams};
use crate::error::{CfResult, CipherForgeError};
use crate::scorer::Scorer;
use crate::stage::Stage;
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

const ATTEMPT_LOG_FILE: &str = "attempts.jsonl";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub report: bool,
    pub report_dir: Option<PathBuf>,
    /// Per-stage candidate limit
    pub limit: usize,
    pub adaptive: bool,
    pub parallel: bool,
    /// `None` keeps every merged candidate
    pub prune: Option<PruneParams>,
    /// Defaults to `<report_dir>/attempts.jsonl` when reporting
    pub attempt_log: Option<PathBuf>,
    pub skip_previous_attempts: bool,
    pub fusion_weight: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RunOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            report: false,
            report_dir: None,
            limit: cfg.search.limit,
            adaptive: false,
            parallel: false,
            prune: Some(cfg.prune.clone()),
            attempt_log: None,
            skip_previous_attempts: false,
            fusion_weight: cfg.search.fusion_weight,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunProfile {
    pub fingerprint: String,
    pub mode: String,
    pub adaptive: bool,
    pub stage_ms: BTreeMap<String, u64>,
    pub total_ms: u64,
    pub skipped: Vec<String>,
    pub adaptive_diagnostics: BTreeMap<String, AdaptiveDiagnostics>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub best: Option<Candidate>,
    /// Stage results in configuration order
    pub lineage: Vec<StageResult>,
    pub retained: Vec<Candidate>,
    pub artifacts: Option<ArtifactPaths>,
    pub attempt_log: Option<PathBuf>,
    pub attempts: Vec<AttemptRecord>,
    pub profile: RunProfile,
}

impl PipelineOutcome {
    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.lineage.iter().find(|r| r.name == name)
    }
}

struct Executor<'a> {
    ciphertext: &'a str,
    fingerprint: &'a str,
    scorer: &'a Scorer,
    limit: usize,
    known: &'a HashSet<AttemptKey>,
}

impl Executor<'_> {
    /// Runs one stage in isolation. Errors become a failed result, never a panic or abort.
    fn execute(&self, stage: &dyn Stage) -> (StageResult, AttemptRecord) {
        let name = stage.name();
        let params = stage.params();
        let key = attempts::attempt_key(self.fingerprint, name, &params);
        let start = Instant::now();

        let (result, skipped) = if self.known.contains(&key) {
            info!("⏭️  Skipping '{}': already attempted", name);
            let mut notes = Meta::new();
            notes.insert("skipped".to_string(), Value::Bool(true));
            (StageResult::from_candidates(name, Vec::new(), notes), true)
        } else {
            debug!("▶️  Stage '{}' ({})", name, stage.kind());
            match stage.run(self.ciphertext, self.scorer) {
                Ok(r) => (r.truncated(self.limit), false),
                Err(e) => {
                    let err = CipherForgeError::Stage {
                        stage: name.to_string(),
                        reason: e.to_string(),
                    };
                    warn!("❌ {}", err);
                    (StageResult::failed(name, &err.to_string()), false)
                }
            }
        };

        let record = AttemptRecord {
            fingerprint: self.fingerprint.to_string(),
            stage: name.to_string(),
            kind: stage.kind(),
            params,
            timestamp: Utc::now(),
            candidate_count: result.candidates().len(),
            best_score: Some(result.score).filter(|s| s.is_finite()),
            error: result.error().map(str::to_string),
            elapsed_ms: start.elapsed().as_millis() as u64,
            skipped,
        };
        (result, record)
    }
}

/// Runs every stage over the same ciphertext and fuses the results.
///
/// Stage failures are isolated: a failing stage contributes an empty result with an
/// `error` note and the remaining stages still run. Only report I/O and option
/// errors propagate.
pub fn run(
    ciphertext: &str,
    stages: &[Box<dyn Stage>],
    scorer: &Scorer,
    opts: &RunOptions,
) -> CfResult<PipelineOutcome> {
    let started = Instant::now();

    let report_dir = match (opts.report, &opts.report_dir) {
        (true, None) => {
            return Err(CipherForgeError::Config(
                "report_dir is required when report is enabled".to_string(),
            ))
        }
        (true, Some(dir)) => Some(dir.clone()),
        (false, _) => None,
    };

    let fp = fingerprint(ciphertext);
    let log_path = opts
        .attempt_log
        .clone()
        .or_else(|| report_dir.as_ref().map(|d| d.join(ATTEMPT_LOG_FILE)));

    // 1. Prior attempts (read once, never inside the search path)
    let known = match (&log_path, opts.skip_previous_attempts) {
        (Some(path), true) => AttemptLog::new(path).known_keys()?,
        (None, true) => {
            warn!("⚠️  skip_previous_attempts set without an attempt log; nothing to skip");
            HashSet::new()
        }
        _ => HashSet::new(),
    };

    // 2. Execute
    let exec = Executor {
        ciphertext,
        fingerprint: &fp,
        scorer,
        limit: opts.limit,
        known: &known,
    };
    let executed: Vec<(StageResult, AttemptRecord)> = if opts.parallel {
        stages.par_iter().map(|s| exec.execute(s.as_ref())).collect()
    } else {
        stages.iter().map(|s| exec.execute(s.as_ref())).collect()
    };
    let (lineage, attempts): (Vec<StageResult>, Vec<AttemptRecord>) =
        executed.into_iter().unzip();

    // 3. Merge, tag and dedup
    let mut seen = HashSet::new();
    let mut merged: Vec<Candidate> = Vec::new();
    for result in &lineage {
        for c in result.candidates() {
            if seen.insert(c.dedup_key()) {
                merged.push(c.with_meta("source_stage", Value::from(result.name.as_str())));
            }
        }
    }

    // 4. Adaptive diagnostics for every stage that ran
    let mut profile = RunProfile {
        fingerprint: fp.clone(),
        mode: if opts.parallel { "parallel" } else { "sequential" }.to_string(),
        adaptive: opts.adaptive,
        ..RunProfile::default()
    };
    for (result, record) in lineage.iter().zip(&attempts) {
        profile.stage_ms.insert(result.name.clone(), record.elapsed_ms);
        if record.skipped {
            profile.skipped.push(result.name.clone());
        } else if opts.adaptive {
            profile.adaptive_diagnostics.insert(
                result.name.clone(),
                adaptive::diagnose(result, scorer, opts.fusion_weight),
            );
        }
    }

    // 5. Best candidate: raw score, or fused score in adaptive mode
    let best = if opts.adaptive {
        let mut best: Option<(f64, &Candidate)> = None;
        for c in &merged {
            let fused = c
                .meta()
                .get("source_stage")
                .and_then(Value::as_str)
                .and_then(|s| profile.adaptive_diagnostics.get(s))
                .map(|d| adaptive::fused_score(c.score(), d))
                .unwrap_or(c.score());
            if best.map_or(true, |(b, _)| fused > b) {
                best = Some((fused, c));
            }
        }
        best.map(|(fused, c)| c.with_meta("fused_score", score_value(fused)))
    } else {
        merged
            .iter()
            .fold(None::<&Candidate>, |acc, c| match acc {
                Some(b) if b.score() >= c.score() => Some(b),
                _ => Some(c),
            })
            .cloned()
    };

    // 6. Prune
    let retained = match &opts.prune {
        Some(p) => p.apply(&merged),
        None => merged,
    };

    // 7. Artifacts and attempt log
    let artifacts = match &report_dir {
        Some(dir) => Some(artifacts::write_run_artifacts(
            dir,
            &format!("pipeline_{}", fp),
            &lineage,
            &retained,
        )?),
        None => None,
    };
    if let Some(path) = &log_path {
        AttemptLog::new(path).append(&attempts)?;
    }

    profile.total_ms = started.elapsed().as_millis() as u64;
    info!(
        "✅ Pipeline finished: {} stages, {} retained, best {:.3} ({} ms)",
        lineage.len(),
        retained.len(),
        best.as_ref().map(Candidate::score).unwrap_or(f64::NEG_INFINITY),
        profile.total_ms
    );

    Ok(PipelineOutcome {
        best,
        lineage,
        retained,
        artifacts,
        attempt_log: log_path,
        attempts,
        profile,
    })
}
