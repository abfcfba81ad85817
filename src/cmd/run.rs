use crate::reports;
use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::pipeline::{self, RunOptions};
use cipherforge::scorer::Scorer;
use cipherforge::stage::{build_stages, load_stage_configs, StageConfig, StageKind};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(long, visible_alias = "text")]
    pub ciphertext: String,

    /// JSON array of stage configurations
    #[arg(short, long)]
    pub stages: Option<PathBuf>,

    #[arg(short, long)]
    pub report_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub adaptive: bool,

    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    #[arg(long, default_value_t = false)]
    pub skip_previous: bool,

    /// Candidates shown in the final table
    #[arg(long, default_value_t = 10)]
    pub show: usize,
}

fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new(StageKind::Score, json!({})),
        StageConfig::new(
            StageKind::Transposition,
            json!({"min_cols": 2, "max_cols": 6, "routes": ["rows", "serpentine", "spiral"]}),
        ),
        StageConfig::new(StageKind::Substitution, json!({"min_key_length": 1, "max_key_length": 8})),
    ]
}

pub fn run(args: &RunArgs, config: &Config, scorer: &Scorer) -> CfResult<()> {
    let configs = match &args.stages {
        Some(path) => {
            info!("📂 Loading stages: {}", path.display());
            load_stage_configs(path)?
        }
        None => default_stages(),
    };
    let stages = build_stages(&configs, config)?;

    let opts = RunOptions {
        report: args.report_dir.is_some(),
        report_dir: args.report_dir.clone(),
        adaptive: args.adaptive,
        parallel: args.parallel,
        skip_previous_attempts: args.skip_previous,
        ..RunOptions::from(config)
    };

    let outcome = pipeline::run(&args.ciphertext, &stages, scorer, &opts)?;

    reports::print_stage_summary(&outcome);
    reports::print_candidates(&outcome.retained, args.show);

    println!("\n=== 🏆 BEST CANDIDATE ===");
    match &outcome.best {
        Some(best) => {
            println!("Score: {:.4}", best.score());
            println!("Text:  {}", best.text());
        }
        None => println!("(no candidates)"),
    }
    if let Some(paths) = &outcome.artifacts {
        println!("\n💾 JSON: {}", paths.json.display());
        println!("💾 CSV:  {}", paths.csv.display());
    }
    if let Some(log) = &outcome.attempt_log {
        println!("📝 Attempts: {}", log.display());
    }
    Ok(())
}
