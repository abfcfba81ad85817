use crate::reports;
use cipherforge::alphabet::normalize;
use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::scorer::Scorer;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub text: String,
}

pub fn run(args: &ScoreArgs, scorer: &Scorer) -> CfResult<()> {
    let text = normalize(&args.text);
    let stats = scorer.baseline_stats(&text);
    reports::print_baseline_stats(&text, &stats);
    println!("combined_score: {:.4}", scorer.combined_score(&text));
    Ok(())
}
