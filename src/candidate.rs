use crate::scorer::Scorer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Strategy-specific diagnostics attached to candidates and stage results.
pub type Meta = Map<String, Value>;

/// An attempted plaintext. Immutable once built; `with_meta` returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    text: String,
    #[serde(serialize_with = "ser_score", deserialize_with = "de_score")]
    score: f64,
    #[serde(default)]
    meta: Meta,
}

impl Candidate {
    pub fn new(text: String, score: f64, meta: Meta) -> Self {
        let score = if score.is_nan() {
            f64::NEG_INFINITY
        } else {
            score
        };
        Self { text, score, meta }
    }

    /// Scores `text` with `extra_bonus` on top of the combined score, and records
    /// the base score and crib bonus in meta.
    pub fn scored(text: String, scorer: &Scorer, extra_bonus: f64, mut meta: Meta) -> Self {
        let base = scorer.combined_score(&text);
        meta.insert("base_score".to_string(), score_value(base));
        meta.insert(
            "crib_bonus".to_string(),
            Value::from(scorer.crib_bonus(&text)),
        );
        Self::new(text, base + extra_bonus, meta)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The crib bonus recorded in meta; 0.0 when absent.
    pub fn crib_bonus(&self) -> f64 {
        self.meta
            .get("crib_bonus")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    pub fn with_meta(&self, key: &str, value: Value) -> Self {
        let mut meta = self.meta.clone();
        meta.insert(key.to_string(), value);
        Self {
            text: self.text.clone(),
            score: self.score,
            meta,
        }
    }

    /// Identity used for deduplication.
    pub fn dedup_key(&self) -> (String, u64) {
        (self.text.clone(), self.score.to_bits())
    }
}

/// Descending by score, -inf last.
pub fn by_score_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Stable sort, highest score first.
pub fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(by_score_desc);
}

/// JSON has no infinities; non-finite scores travel as `null`.
pub fn score_value(score: f64) -> Value {
    if score.is_finite() {
        Value::from(score)
    } else {
        Value::Null
    }
}

fn ser_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if score.is_finite() {
        serializer.serialize_f64(*score)
    } else {
        serializer.serialize_none()
    }
}

fn de_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
}

/// The outcome of running one stage once.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub name: String,
    pub output: String,
    pub score: f64,
    candidates: Vec<Candidate>,
    notes: Meta,
}

impl StageResult {
    /// Sorts the candidates (stable, highest first) and takes output/score from the best.
    pub fn from_candidates(name: &str, mut candidates: Vec<Candidate>, notes: Meta) -> Self {
        sort_by_score(&mut candidates);
        let (output, score) = match candidates.first() {
            Some(best) => (best.text().to_string(), best.score()),
            None => (String::new(), f64::NEG_INFINITY),
        };
        Self {
            name: name.to_string(),
            output,
            score,
            candidates,
            notes,
        }
    }

    /// A stage that raised: no candidates, the error kept as a note.
    pub fn failed(name: &str, error: &str) -> Self {
        let mut notes = Meta::new();
        notes.insert("error".to_string(), Value::from(error));
        Self::from_candidates(name, Vec::new(), notes)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn notes(&self) -> &Meta {
        &self.notes
    }

    pub fn error(&self) -> Option<&str> {
        self.notes.get("error").and_then(Value::as_str)
    }

    pub fn truncated(mut self, limit: usize) -> Self {
        self.candidates.truncate(limit);
        self
    }

    /// Full metadata mapping: the notes plus `candidates`.
    pub fn metadata(&self) -> Meta {
        let mut meta = self.notes.clone();
        meta.insert(
            "candidates".to_string(),
            serde_json::to_value(&self.candidates).unwrap_or(Value::Array(Vec::new())),
        );
        meta
    }
}

#[derive(Serialize)]
struct StageResultView<'a> {
    output: &'a str,
    #[serde(serialize_with = "ser_score")]
    score: f64,
    metadata: StageMetadataView<'a>,
}

#[derive(Serialize)]
struct StageMetadataView<'a> {
    candidates: &'a [Candidate],
    #[serde(flatten)]
    notes: &'a Meta,
}

/// Serializes as `{output, score, metadata}`; the name is the key in the lineage map.
impl Serialize for StageResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StageResultView {
            output: &self.output,
            score: self.score,
            metadata: StageMetadataView {
                candidates: &self.candidates,
                notes: &self.notes,
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_infinity_survives_json() {
        let c = Candidate::new("ABC".to_string(), f64::NEG_INFINITY, Meta::new());
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("null"));
        let back: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.score(), f64::NEG_INFINITY);
    }

    #[test]
    fn stage_result_takes_best_candidate() {
        let cands = vec![
            Candidate::new("LOW".to_string(), 1.0, Meta::new()),
            Candidate::new("HIGH".to_string(), 5.0, Meta::new()),
        ];
        let r = StageResult::from_candidates("t", cands, Meta::new());
        assert_eq!(r.output, "HIGH");
        assert_eq!(r.candidates()[1].text(), "LOW");
        assert!(r.metadata().contains_key("candidates"));
    }
}
