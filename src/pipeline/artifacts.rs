use crate::candidate::{Candidate, StageResult};
use crate::error::CfResult;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// Lineage as `{stage: {output, score, metadata}}`, in stage order.
struct LineageView<'a>(&'a [StageResult]);

impl Serialize for LineageView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|r| (r.name.as_str(), r)))
    }
}

#[derive(Serialize)]
struct CandidateRow<'a> {
    text: &'a str,
    score: Option<f64>,
    source_stage: &'a str,
}

pub fn write_lineage_json(path: &Path, lineage: &[StageResult]) -> CfResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &LineageView(lineage))?;
    Ok(())
}

pub fn write_candidates_csv(path: &Path, candidates: &[Candidate]) -> CfResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for c in candidates {
        wtr.serialize(CandidateRow {
            text: c.text(),
            score: Some(c.score()).filter(|s| s.is_finite()),
            source_stage: c
                .meta()
                .get("source_stage")
                .and_then(Value::as_str)
                .unwrap_or(""),
        })?;
    }
    // A header row is still written for an empty set.
    if candidates.is_empty() {
        wtr.write_record(["text", "score", "source_stage"])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<stem>.json` and `<stem>.csv` under `dir`, creating it if needed.
pub fn write_run_artifacts(
    dir: &Path,
    stem: &str,
    lineage: &[StageResult],
    retained: &[Candidate],
) -> CfResult<ArtifactPaths> {
    fs::create_dir_all(dir)?;
    let paths = ArtifactPaths {
        json: dir.join(format!("{}.json", stem)),
        csv: dir.join(format!("{}.csv", stem)),
    };
    write_lineage_json(&paths.json, lineage)?;
    write_candidates_csv(&paths.csv, retained)?;
    Ok(paths)
}
