mod common;

use common::{plaintext_slice, ENGLISH_CORPUS};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_ngrams(dir: &Path) -> String {
    let letters = cipherforge::alphabet::normalize(ENGLISH_CORPUS);
    let mut lines = String::new();
    for n in 2..=4 {
        for w in letters.as_bytes().windows(n) {
            lines.push_str(&format!("{}\t1\n", String::from_utf8_lossy(w)));
        }
    }
    let path = dir.join("ngrams.tsv");
    fs::write(&path, lines).unwrap();
    path.to_string_lossy().into_owned()
}

fn cipherforge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cipherforge"))
        .args(args)
        .output()
        .unwrap()
}

// --- SCORE ---
#[test]
fn test_score_prints_combined_score() {
    let dir = TempDir::new().unwrap();
    let ngrams = write_ngrams(dir.path());
    let out = cipherforge(&["score", "--text", "The river ran slowly", "-n", &ngrams]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let re = Regex::new(r"combined_score: -?\d+\.\d{4}").unwrap();
    assert!(re.is_match(&stdout), "unexpected output:\n{}", stdout);
    assert!(stdout.contains("quadgram"));
}

#[test]
fn test_bad_weights_file_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let weights = dir.path().join("weights.json");
    fs::write(&weights, "{ broken").unwrap();
    let out = cipherforge(&[
        "score",
        "--text",
        "ABC",
        "--weights",
        weights.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid weights"));
}

// --- RUN ---
#[test]
fn test_run_writes_report() {
    let dir = TempDir::new().unwrap();
    let ngrams = write_ngrams(dir.path());
    let report = dir.path().join("report");
    let ct = plaintext_slice(0, 48);
    let out = cipherforge(&[
        "run",
        "--ciphertext",
        &ct,
        "--report-dir",
        report.to_str().unwrap(),
        "--max-perms",
        "120",
        "-n",
        &ngrams,
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("BEST CANDIDATE"));
    assert!(report.join("attempts.jsonl").exists());
    let names: Vec<String> = fs::read_dir(&report)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let artifact = Regex::new(r"^pipeline_[0-9a-f]{16}\.(json|csv)$").unwrap();
    assert_eq!(names.iter().filter(|n| artifact.is_match(n)).count(), 2);
}

// --- CALIBRATE ---
#[test]
fn test_calibrate_writes_sweep_csv() {
    let dir = TempDir::new().unwrap();
    let ngrams = write_ngrams(dir.path());
    let samples = dir.path().join("samples.csv");
    let mut csv = String::from("text\n");
    for i in 0..4 {
        csv.push_str(&format!("{}\n", plaintext_slice(i * 200, 80)));
    }
    csv.push_str("QZXJKVQZXJKVQZXJKV\n");
    fs::write(&samples, csv).unwrap();
    let out_dir = dir.path().join("cal");

    let out = cipherforge(&[
        "calibrate",
        "--samples",
        samples.to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
        "-n",
        &ngrams,
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let sweep = fs::read_to_string(out_dir.join("calibration_sweep.csv")).unwrap();
    // Header plus five rarity and five positional rows
    assert_eq!(sweep.lines().count(), 11);
}
