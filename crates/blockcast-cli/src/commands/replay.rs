//! Offline replay of a recorded observation log.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;

use blockcast_core::{parse_observations, BlockPredictor, Config, Event, Replayer, StateStore};

#[derive(Args)]
pub struct ReplayArgs {
    /// Predictor name
    name: String,
    /// JSON-lines file of `{"at": ..., "state": ...}` observations
    file: PathBuf,
    /// Continue firing boundaries until this time (RFC 3339)
    #[arg(long)]
    until: Option<DateTime<Utc>>,
    /// Start from the stored state instead of a fresh buffer
    #[arg(long)]
    resume: bool,
    /// Persist the resulting state
    #[arg(long)]
    save: bool,
    /// Print every event as a JSON line
    #[arg(long)]
    events: bool,
}

pub fn run(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let cfg = config
        .find(&args.name)
        .cloned()
        .ok_or_else(|| format!("unknown predictor: {}", args.name))?;

    let content = std::fs::read_to_string(&args.file)?;
    let observations = parse_observations(&content)?;
    let Some(first) = observations.first() else {
        return Err(format!("no observations in {}", args.file.display()).into());
    };

    let store = StateStore::open_default()?;
    let persisted = if args.resume {
        store.load(cfg.unique_id())?
    } else {
        None
    };

    let predictor = BlockPredictor::new(cfg.clone())?;
    let (mut replayer, attached) = Replayer::start(predictor, persisted, first.at);
    let mut events = vec![attached];
    for observation in &observations {
        events.extend(replayer.observe(*observation)?);
    }
    if let Some(until) = args.until {
        events.extend(replayer.advance_to(until));
    }

    if args.events {
        for event in &events {
            println!("{}", serde_json::to_string(event)?);
        }
    }

    let completed = events
        .iter()
        .filter(|e| matches!(e, Event::BlockCompleted { .. }))
        .count();
    let attrs = replayer.predictor().attributes();
    eprintln!(
        "Replayed {} observation(s), {} block(s) completed, up to {}",
        observations.len(),
        completed,
        replayer.cursor().to_rfc3339()
    );
    println!("{}", serde_json::to_string_pretty(&attrs)?);

    if args.save {
        store.save(cfg.unique_id(), &attrs)?;
        eprintln!("Saved to: {}", store.path_for(cfg.unique_id()).display());
    }
    Ok(())
}
