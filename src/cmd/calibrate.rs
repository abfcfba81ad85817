use crate::reports;
use cipherforge::calibration::{
    baseline_scores, load_samples, pick_best_weight_from_rows, sweep_positional_weight,
    sweep_rarity_weight, write_calibration_artifact, Objective, SweepKind,
};
use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::scorer::Scorer;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub config: Config,

    /// CSV with a `text` column and an optional `label` column
    #[arg(long)]
    pub samples: PathBuf,

    #[arg(short, long, default_value = "calibration")]
    pub out: PathBuf,

    #[arg(long, value_delimiter = ',', default_value = "0,0.25,0.5,1,2")]
    pub rarity_weights: Vec<f64>,

    #[arg(long, value_delimiter = ',', default_value = "0,1,2.5,5,10")]
    pub positional_weights: Vec<f64>,

    /// Rank by |spearman| instead of spearman
    #[arg(long, default_value_t = false)]
    pub abs: bool,
}

pub fn run(args: &CalibrateArgs, scorer: &Scorer) -> CfResult<()> {
    let samples = load_samples(&args.samples)?;
    info!("📂 Loaded {} samples from {}", samples.len(), args.samples.display());

    let baseline = baseline_scores(&samples, scorer);
    let objective = if args.abs {
        Objective::MaxAbsCorrelation
    } else {
        Objective::MaxCorrelation
    };

    let rarity = sweep_rarity_weight(&samples, &baseline, &args.rarity_weights, scorer)?;
    let positional =
        sweep_positional_weight(&samples, &baseline, &args.positional_weights, scorer)?;

    reports::print_calibration(
        SweepKind::Rarity,
        &rarity.rows,
        &rarity.failures,
        pick_best_weight_from_rows(&rarity.rows, objective),
    );
    reports::print_calibration(
        SweepKind::Positional,
        &positional.rows,
        &positional.failures,
        pick_best_weight_from_rows(&positional.rows, objective),
    );

    let path = write_calibration_artifact(&args.out, &rarity.rows, &positional.rows)?;
    println!("\n💾 Calibration artifact: {}", path.display());
    Ok(())
}
