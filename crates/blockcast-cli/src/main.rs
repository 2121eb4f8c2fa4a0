use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "blockcast", version, about = "Time-block probability predictor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predictor configuration
    Predictor {
        #[command(subcommand)]
        action: commands::predictor::PredictorAction,
    },
    /// Stored predictor state
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Replay recorded observations through a predictor
    Replay(commands::replay::ReplayArgs),
    /// Attach all predictors and feed them signal changes from stdin
    Run,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Predictor { action } => commands::predictor::run(action),
        Commands::State { action } => commands::state::run(action),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Run => commands::run::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
