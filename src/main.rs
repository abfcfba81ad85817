use cipherforge::config::{Config, ScoringWeights};
use cipherforge::scorer::{LanguageModelBuilder, Scorer};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use std::sync::Arc;
use tracing::{info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/ngrams.tsv")]
    ngrams: String,

    #[arg(global = true, short, long)]
    cribs: Option<String>,

    #[arg(global = true, short = 'w', long)]
    wordlist: Option<String>,

    #[arg(global = true, long)]
    weights: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Score(cmd::score::ScoreArgs),
    Run(cmd::run::RunArgs),
    Calibrate(cmd::calibrate::CalibrateArgs),
}

fn fatal(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}:", context);
    eprintln!("   {}", e);
    process::exit(1);
}

fn main() {
    // 1. Parse raw matches (to distinguish user input from defaults)
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    info!("🚀 Initializing CipherForge...");

    // 2. CLI-provided config and the subcommand's own matches
    let (mut config, sub_name): (Config, &str) = match &cli.command {
        Commands::Score(args) => (args.config.clone(), "score"),
        Commands::Run(args) => (args.config.clone(), "run"),
        Commands::Calibrate(args) => (args.config.clone(), "calibrate"),
    };
    let Some(sub_matches) = matches.subcommand_matches(sub_name) else {
        fatal("Argument error", format!("missing '{}' matches", sub_name));
    };

    // 3. Weights: JSON file as the base, explicit CLI flags on top
    if let Some(path) = &cli.weights {
        info!("⚖️  Loading weights from: {}", path);
        let mut file_weights =
            ScoringWeights::load_from_file(path).unwrap_or_else(|e| fatal("Invalid weights", e));
        file_weights.merge_from_cli(&config.weights, sub_matches);
        config.weights = file_weights;
    } else {
        info!("⚠️  No external weights loaded. Using embedded defaults.");
    }
    if let Err(e) = config.weights.validate() {
        fatal("Invalid weights", e);
    }

    // 4. Shared language model
    let mut builder = LanguageModelBuilder::new().with_ngrams_from_file(&cli.ngrams);
    if let Some(path) = &cli.cribs {
        builder = builder.with_cribs_from_file(path);
    }
    if let Some(path) = &cli.wordlist {
        builder = builder.with_wordlist_from_file(path);
    }
    let scorer = Scorer::new(Arc::new(builder.build()), config.weights.clone());

    // 5. Execute
    let result = match &cli.command {
        Commands::Score(args) => cmd::score::run(args, &scorer),
        Commands::Run(args) => cmd::run::run(args, &config, &scorer),
        Commands::Calibrate(args) => cmd::calibrate::run(args, &scorer),
    };
    if let Err(e) = result {
        fatal("Command failed", e);
    }
}
