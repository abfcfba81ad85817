use crate::consts::{MAX_POSITIONAL_PERIOD, MIN_POSITIONAL_PERIOD};
use crate::error::{CfResult, CipherForgeError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub weights: ScoringWeights,
    #[command(flatten)]
    pub prune: PruneParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Tolerance (in letters) around each expected crib offset
    #[arg(long, default_value_t = 2)]
    pub window: usize,
    #[arg(long, default_value_t = 5040)]
    pub max_perms: usize,
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
    #[arg(long, default_value_t = 3)]
    pub top_n: usize,
    #[arg(long, default_value_t = 256)]
    pub beam_width: usize,
    #[arg(long, default_value_t = 1.0)]
    pub dictionary_weight: f64,
    #[arg(long, default_value_t = 3.0)]
    pub positional_crib_bonus: f64,
    #[arg(long, default_value_t = 10.0)]
    pub fusion_weight: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            window: 2,
            max_perms: 5040,
            limit: 50,
            top_n: 3,
            beam_width: 256,
            dictionary_weight: 1.0,
            positional_crib_bonus: 3.0,
            fusion_weight: 10.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    // === N-GRAMS ===
    #[arg(long, default_value_t = 0.5)]
    pub weight_bigram: f64,
    #[arg(long, default_value_t = 1.0)]
    pub weight_trigram: f64,
    #[arg(long, default_value_t = 1.5)]
    pub weight_quadgram: f64,

    // === CRIBS ===
    #[arg(long, default_value_t = 1.0)]
    pub weight_crib: f64,
    #[arg(long, default_value_t = 0.5)]
    pub weight_rarity: f64,

    // === POSITIONAL ===
    #[arg(long, default_value_t = 5.0)]
    pub weight_positional: f64,
    #[arg(long, default_value_t = 3)]
    pub positional_period: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weight_bigram: 0.5,
            weight_trigram: 1.0,
            weight_quadgram: 1.5,
            weight_crib: 1.0,
            weight_rarity: 0.5,
            weight_positional: 5.0,
            positional_period: 3,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PruneParams {
    #[arg(long, default_value_t = 20)]
    pub prune_top_n: usize,
    #[arg(long, default_value_t = 50)]
    pub candidate_cap: usize,
    #[arg(long, default_value_t = 5.0)]
    pub crib_bonus_threshold: f64,
}

impl Default for PruneParams {
    fn default() -> Self {
        Self {
            prune_top_n: 20,
            candidate_cap: 50,
            crib_bonus_threshold: 5.0,
        }
    }
}

impl ScoringWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        let weights: ScoringWeights = serde_json::from_str(&content)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Period clamped to the range covered by the expected English profile.
    #[inline(always)]
    pub fn effective_period(&self) -> usize {
        self.positional_period
            .clamp(MIN_POSITIONAL_PERIOD, MAX_POSITIONAL_PERIOD)
    }

    pub fn validate(&self) -> CfResult<()> {
        let named = [
            ("weight_bigram", self.weight_bigram),
            ("weight_trigram", self.weight_trigram),
            ("weight_quadgram", self.weight_quadgram),
            ("weight_crib", self.weight_crib),
            ("weight_rarity", self.weight_rarity),
            ("weight_positional", self.weight_positional),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(CipherForgeError::Config(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn merge_from_cli(&mut self, cli_weights: &ScoringWeights, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_weights.$field.clone();
                }
            };
        }

        update_if_present!(weight_bigram, "weight_bigram");
        update_if_present!(weight_trigram, "weight_trigram");
        update_if_present!(weight_quadgram, "weight_quadgram");

        update_if_present!(weight_crib, "weight_crib");
        update_if_present!(weight_rarity, "weight_rarity");

        update_if_present!(weight_positional, "weight_positional");
        update_if_present!(positional_period, "positional_period");
    }
}
