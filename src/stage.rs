use crate::alphabet::{normalize, KeyedAlphabet};
use crate::candidate::{Candidate, Meta, StageResult};
use crate::config::Config;
use crate::error::{CfResult, CipherForgeError};
use crate::scorer::Scorer;
use crate::search::refine::{hill_climb_columnar, RefineOptions};
use crate::search::substitution::{recover_keys, KeyRecoveryOptions};
use crate::search::transposition::{sweep_columns, PositionalCribs, Route, TranspositionOptions};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// One configured search strategy: ciphertext in, ranked candidates out.
///
/// Stages hold no mutable state, so the same stage run twice on the same
/// ciphertext with the same weights gives the same result.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> StageKind;
    /// Fully resolved parameters, used for provenance.
    fn params(&self) -> Value;
    fn run(&self, ciphertext: &str, scorer: &Scorer) -> CfResult<StageResult>;
}

#[derive(
    Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Score,
    Transposition,
    Substitution,
    HillClimb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub kind: StageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub params: Value,
}

impl StageConfig {
    pub fn new(kind: StageKind, params: Value) -> Self {
        Self {
            kind,
            name: None,
            params,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

// ==================================================================================
// PARAMETER SURFACES
// ==================================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreParams {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TranspositionParams {
    pub min_cols: usize,
    pub max_cols: usize,
    pub routes: Vec<Route>,
    pub positional_cribs: PositionalCribs,
    pub window: Option<usize>,
    pub max_perms: Option<usize>,
    pub limit: Option<usize>,
}

impl Default for TranspositionParams {
    fn default() -> Self {
        Self {
            min_cols: 2,
            max_cols: 6,
            routes: vec![Route::Rows],
            positional_cribs: PositionalCribs::new(),
            window: None,
            max_perms: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SubstitutionParams {
    pub min_key_length: usize,
    pub max_key_length: usize,
    pub keys_per_length: usize,
    /// Explicit keys tried as-is, in addition to recovered ones
    pub keywords: Vec<String>,
    pub alphabet_keyword: Option<String>,
    /// Explicit 26-letter ordering
    pub alphabet: Option<String>,
    pub top_n: Option<usize>,
    pub beam_width: Option<usize>,
    pub use_dictionary: bool,
    pub dictionary_weight: Option<f64>,
    pub limit: Option<usize>,
}

impl Default for SubstitutionParams {
    fn default() -> Self {
        Self {
            min_key_length: 1,
            max_key_length: 8,
            keys_per_length: 5,
            keywords: Vec::new(),
            alphabet_keyword: None,
            alphabet: None,
            top_n: None,
            beam_width: None,
            use_dictionary: false,
            dictionary_weight: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HillClimbParams {
    pub n_cols: usize,
    pub route: Route,
    pub restarts: usize,
    pub steps: usize,
    pub partial_len: usize,
    pub partial_min: f64,
    pub prune: bool,
    pub seed: u64,
    pub positional_cribs: PositionalCribs,
    pub window: Option<usize>,
    pub limit: Option<usize>,
}

impl Default for HillClimbParams {
    fn default() -> Self {
        let r = RefineOptions::default();
        Self {
            n_cols: r.n_cols,
            route: r.route,
            restarts: r.restarts,
            steps: r.steps,
            partial_len: r.partial_len,
            partial_min: r.partial_min,
            prune: r.prune,
            seed: r.seed,
            positional_cribs: PositionalCribs::new(),
            window: None,
            limit: None,
        }
    }
}

fn parse_params<P: DeserializeOwned>(kind: StageKind, raw: &Value) -> CfResult<P> {
    let raw = match raw {
        Value::Null => Value::Object(Meta::new()),
        other => other.clone(),
    };
    serde_json::from_value(raw)
        .map_err(|e| CipherForgeError::Config(format!("Invalid {} parameters: {}", kind, e)))
}

fn invalid(kind: StageKind, msg: String) -> CipherForgeError {
    CipherForgeError::Config(format!("Invalid {} parameters: {}", kind, msg))
}

fn to_params_value<P: Serialize>(params: &P) -> Value {
    serde_json::to_value(params).unwrap_or(Value::Null)
}

fn notes_for(kind: StageKind) -> Meta {
    let mut notes = Meta::new();
    notes.insert("kind".to_string(), Value::from(kind.to_string()));
    notes
}

// ==================================================================================
// STAGES
// ==================================================================================

/// Scores the ciphertext as-is. Useful as a baseline row in the lineage.
pub struct ScoreStage {
    name: String,
}

impl Stage for ScoreStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StageKind {
        StageKind::Score
    }

    fn params(&self) -> Value {
        to_params_value(&ScoreParams::default())
    }

    fn run(&self, ciphertext: &str, scorer: &Scorer) -> CfResult<StageResult> {
        let text = normalize(ciphertext);
        let mut meta = Meta::new();
        let stats = scorer.baseline_stats(&text).as_map();
        meta.insert("stats".to_string(), serde_json::to_value(stats)?);
        let candidate = Candidate::scored(text, scorer, 0.0, meta);
        Ok(StageResult::from_candidates(
            &self.name,
            vec![candidate],
            notes_for(StageKind::Score),
        ))
    }
}

pub struct TranspositionStage {
    name: String,
    params: TranspositionParams,
    options: TranspositionOptions,
}

impl TranspositionStage {
    pub fn new(name: &str, mut params: TranspositionParams, cfg: &Config) -> CfResult<Self> {
        let kind = StageKind::Transposition;
        if params.min_cols < 2 {
            return Err(invalid(kind, format!("min_cols must be >= 2, got {}", params.min_cols)));
        }
        if params.min_cols > params.max_cols {
            return Err(invalid(
                kind,
                format!("min_cols {} > max_cols {}", params.min_cols, params.max_cols),
            ));
        }
        if params.routes.is_empty() {
            return Err(invalid(kind, "routes must not be empty".to_string()));
        }
        let options = TranspositionOptions {
            window: *params.window.get_or_insert(cfg.search.window),
            max_perms: *params.max_perms.get_or_insert(cfg.search.max_perms),
            limit: *params.limit.get_or_insert(cfg.search.limit),
            route: params.routes[0],
            bonus_per_letter: cfg.search.positional_crib_bonus,
        };
        Ok(Self {
            name: name.to_string(),
            params,
            options,
        })
    }
}

impl Stage for TranspositionStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StageKind {
        StageKind::Transposition
    }

    fn params(&self) -> Value {
        to_params_value(&self.params)
    }

    fn run(&self, ciphertext: &str, scorer: &Scorer) -> CfResult<StageResult> {
        let p = &self.params;
        let candidates = sweep_columns(
            ciphertext,
            p.min_cols..=p.max_cols,
            &p.routes,
            &p.positional_cribs,
            &self.options,
            scorer,
        )?;
        let mut notes = notes_for(self.kind());
        notes.insert(
            "positional_cribs".to_string(),
            Value::from(p.positional_cribs.len()),
        );
        Ok(StageResult::from_candidates(&self.name, candidates, notes))
    }
}

pub struct SubstitutionStage {
    name: String,
    params: SubstitutionParams,
    alphabet: KeyedAlphabet,
    keywords: Vec<String>,
    options: KeyRecoveryOptions,
    limit: usize,
}

impl SubstitutionStage {
    pub fn new(name: &str, mut params: SubstitutionParams, cfg: &Config) -> CfResult<Self> {
        let kind = StageKind::Substitution;
        if params.min_key_length == 0 {
            return Err(invalid(kind, "min_key_length must be >= 1".to_string()));
        }
        if params.max_key_length < params.min_key_length {
            return Err(invalid(
                kind,
                format!(
                    "max_key_length {} < min_key_length {}",
                    params.max_key_length, params.min_key_length
                ),
            ));
        }
        let alphabet = match (&params.alphabet, &params.alphabet_keyword) {
            (Some(_), Some(_)) => {
                return Err(invalid(
                    kind,
                    "alphabet and alphabet_keyword are mutually exclusive".to_string(),
                ))
            }
            (Some(order), None) => KeyedAlphabet::parse(order)?,
            (None, Some(kw)) => KeyedAlphabet::from_keyword(kw),
            (None, None) => KeyedAlphabet::standard(),
        };
        let mut keywords = Vec::with_capacity(params.keywords.len());
        for kw in &params.keywords {
            let key = normalize(kw);
            if key.is_empty() {
                return Err(invalid(kind, format!("keyword '{}' has no letters", kw)));
            }
            keywords.push(key);
        }
        let options = KeyRecoveryOptions {
            top_n: *params.top_n.get_or_insert(cfg.search.top_n),
            beam_width: *params.beam_width.get_or_insert(cfg.search.beam_width),
            max_keys: params.keys_per_length.max(1),
            use_dictionary: params.use_dictionary,
            dictionary_weight: *params
                .dictionary_weight
                .get_or_insert(cfg.search.dictionary_weight),
        };
        let limit = *params.limit.get_or_insert(cfg.search.limit);
        Ok(Self {
            name: name.to_string(),
            params,
            alphabet,
            keywords,
            options,
            limit,
        })
    }
}

impl Stage for SubstitutionStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StageKind {
        StageKind::Substitution
    }

    fn params(&self) -> Value {
        to_params_value(&self.params)
    }

    fn run(&self, ciphertext: &str, scorer: &Scorer) -> CfResult<StageResult> {
        let p = &self.params;
        let wordlist = &scorer.model.wordlist;
        let mut candidates = Vec::new();
        let mut lengths_run = 0usize;

        for key_len in p.min_key_length..=p.max_key_length {
            let recovery = match recover_keys(
                ciphertext,
                key_len,
                &self.alphabet,
                &self.options,
                Some(wordlist),
            ) {
                Ok(r) => r,
                Err(CipherForgeError::InputShape(reason)) => {
                    debug!("Skipping key length {}: {}", key_len, reason);
                    continue;
                }
                Err(e) => return Err(e),
            };
            lengths_run += 1;

            let rankings: Vec<Value> = recovery
                .rankings
                .iter()
                .map(|col| {
                    let top: String = col
                        .iter()
                        .take(self.options.top_n)
                        .map(|&(sym, _)| sym as char)
                        .collect();
                    Value::from(top)
                })
                .collect();

            for (rank, key) in recovery.keys.into_iter().enumerate() {
                let mut meta = Meta::new();
                meta.insert("key".to_string(), Value::from(key.key));
                meta.insert("key_len".to_string(), Value::from(key_len));
                meta.insert("key_rank".to_string(), Value::from(rank + 1));
                meta.insert("column_score".to_string(), Value::from(key.column_score));
                meta.insert(
                    "dictionary_hits".to_string(),
                    Value::from(key.dictionary_hits),
                );
                meta.insert(
                    "column_rankings".to_string(),
                    Value::Array(rankings.clone()),
                );
                candidates.push(Candidate::scored(key.plaintext, scorer, 0.0, meta));
            }
        }

        for key in &self.keywords {
            match self.alphabet.decrypt(ciphertext, key) {
                Ok(plain) => {
                    let mut meta = Meta::new();
                    meta.insert("key".to_string(), Value::from(key.as_str()));
                    meta.insert("key_len".to_string(), Value::from(key.len()));
                    meta.insert("source".to_string(), Value::from("keyword"));
                    candidates.push(Candidate::scored(plain, scorer, 0.0, meta));
                }
                Err(e) => warn!("⚠️  Keyword '{}' skipped: {}", key, e),
            }
        }

        if lengths_run == 0 && candidates.is_empty() {
            return Err(CipherForgeError::InputShape(format!(
                "Ciphertext too short for key lengths {}..={}",
                p.min_key_length, p.max_key_length
            )));
        }

        let mut notes = notes_for(self.kind());
        notes.insert("alphabet".to_string(), Value::from(self.alphabet.to_string()));
        notes.insert("key_lengths_run".to_string(), Value::from(lengths_run));
        Ok(StageResult::from_candidates(&self.name, candidates, notes).truncated(self.limit))
    }
}

pub struct HillClimbStage {
    name: String,
    params: HillClimbParams,
    options: RefineOptions,
}

impl HillClimbStage {
    pub fn new(name: &str, mut params: HillClimbParams, cfg: &Config) -> CfResult<Self> {
        let kind = StageKind::HillClimb;
        if params.n_cols < 2 {
            return Err(invalid(kind, format!("n_cols must be >= 2, got {}", params.n_cols)));
        }
        if params.restarts == 0 {
            return Err(invalid(kind, "restarts must be >= 1".to_string()));
        }
        if !params.partial_min.is_finite() {
            return Err(invalid(kind, "partial_min must be finite".to_string()));
        }
        let options = RefineOptions {
            n_cols: params.n_cols,
            route: params.route,
            restarts: params.restarts,
            steps: params.steps,
            partial_len: params.partial_len,
            partial_min: params.partial_min,
            prune: params.prune,
            seed: params.seed,
            window: *params.window.get_or_insert(cfg.search.window),
            bonus_per_letter: cfg.search.positional_crib_bonus,
            limit: *params.limit.get_or_insert(cfg.search.limit),
        };
        Ok(Self {
            name: name.to_string(),
            params,
            options,
        })
    }
}

impl Stage for HillClimbStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StageKind {
        StageKind::HillClimb
    }

    fn params(&self) -> Value {
        to_params_value(&self.params)
    }

    fn run(&self, ciphertext: &str, scorer: &Scorer) -> CfResult<StageResult> {
        let candidates = hill_climb_columnar(
            ciphertext,
            &self.params.positional_cribs,
            &self.options,
            scorer,
        )?;
        let mut notes = notes_for(self.kind());
        notes.insert("seed".to_string(), Value::from(self.params.seed));
        Ok(StageResult::from_candidates(&self.name, candidates, notes))
    }
}

// ==================================================================================
// FACTORY
// ==================================================================================

/// Builds one stage, rejecting unknown parameters and invalid ranges.
pub fn build_stage(config: &StageConfig, cfg: &Config) -> CfResult<Box<dyn Stage>> {
    let kind = config.kind;
    let default_name = kind.to_string();
    let name = config.name.as_deref().unwrap_or(&default_name);
    let stage: Box<dyn Stage> = match kind {
        StageKind::Score => {
            let _: ScoreParams = parse_params(kind, &config.params)?;
            Box::new(ScoreStage {
                name: name.to_string(),
            })
        }
        StageKind::Transposition => Box::new(TranspositionStage::new(
            name,
            parse_params(kind, &config.params)?,
            cfg,
        )?),
        StageKind::Substitution => Box::new(SubstitutionStage::new(
            name,
            parse_params(kind, &config.params)?,
            cfg,
        )?),
        StageKind::HillClimb => Box::new(HillClimbStage::new(
            name,
            parse_params(kind, &config.params)?,
            cfg,
        )?),
    };
    Ok(stage)
}

/// Builds every stage. Repeated names get a `#n` suffix so lineage keys stay unique.
pub fn build_stages(configs: &[StageConfig], cfg: &Config) -> CfResult<Vec<Box<dyn Stage>>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    configs
        .iter()
        .map(|c| {
            let base = c.name.clone().unwrap_or_else(|| c.kind.to_string());
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let mut c = c.clone();
            if *count > 1 {
                c.name = Some(format!("{}#{}", base, count));
            }
            build_stage(&c, cfg)
        })
        .collect()
}

/// Reads a JSON array of stage configurations.
pub fn load_stage_configs<P: AsRef<Path>>(path: P) -> CfResult<Vec<StageConfig>> {
    let content = fs::read_to_string(path)?;
    let configs: Vec<StageConfig> = serde_json::from_str(&content)?;
    if configs.is_empty() {
        return Err(CipherForgeError::Config(
            "Stage list must not be empty".to_string(),
        ));
    }
    Ok(configs)
}
