use crate::alphabet::normalize;
use crate::error::CfResult;
use crate::stage::StageKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Hex characters of the SHA-256 digest kept in a fingerprint.
const FINGERPRINT_LEN: usize = 16;

/// Stable identity of a ciphertext: SHA-256 of its normalized letters, hex prefix.
pub fn fingerprint(ciphertext: &str) -> String {
    let digest = Sha256::digest(normalize(ciphertext).as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// (fingerprint, stage name, canonical params JSON)
pub type AttemptKey = (String, String, String);

pub fn attempt_key(fingerprint: &str, stage: &str, params: &Value) -> AttemptKey {
    (
        fingerprint.to_string(),
        stage.to_string(),
        params.to_string(),
    )
}

/// One stage invocation, as written to the attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub fingerprint: String,
    pub stage: String,
    pub kind: StageKind,
    pub params: Value,
    pub timestamp: DateTime<Utc>,
    pub candidate_count: usize,
    pub best_score: Option<f64>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub skipped: bool,
}

impl AttemptRecord {
    pub fn key(&self) -> AttemptKey {
        attempt_key(&self.fingerprint, &self.stage, &self.params)
    }
}

/// Append-only JSON-lines log of attempts. Written by the executor only.
#[derive(Debug, Clone)]
pub struct AttemptLog {
    path: PathBuf,
}

impl AttemptLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, records: &[AttemptRecord]) -> CfResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Every readable record. A missing log is empty; malformed lines are skipped.
    pub fn load(&self) -> CfResult<Vec<AttemptRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AttemptRecord>(line) {
                Ok(r) => records.push(r),
                Err(e) => warn!(
                    "⚠️  Skipping malformed attempt record at {}:{}: {}",
                    self.path.display(),
                    i + 1,
                    e
                ),
            }
        }
        Ok(records)
    }

    /// Keys of attempts that actually ran (skips are not counted).
    pub fn known_keys(&self) -> CfResult<HashSet<AttemptKey>> {
        Ok(self
            .load()?
            .iter()
            .filter(|r| !r.skipped)
            .map(AttemptRecord::key)
            .collect())
    }
}
