//! Inspect and reset stored predictor state.

use chrono::Utc;
use clap::Subcommand;

use blockcast_core::{render_ascii_chart, BlockPredictor, Config, PredictorConfig, StateStore};

#[derive(Subcommand)]
pub enum StateAction {
    /// Show stored attributes and learned probabilities
    Show {
        /// Predictor name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete stored state
    Reset {
        /// Predictor name
        name: String,
    },
}

pub fn run(action: StateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StateAction::Show { name, json } => show_state(&name, json),
        StateAction::Reset { name } => reset_state(&name),
    }
}

fn find_predictor(name: &str) -> Result<PredictorConfig, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config
        .find(name)
        .cloned()
        .ok_or_else(|| format!("unknown predictor: {name}").into())
}

fn show_state(name: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = find_predictor(name)?;
    let store = StateStore::open_default()?;
    let stored = store.load(cfg.unique_id())?;
    let has_state = stored.is_some();

    // Attaching aligns the stored buffer to the current block, the same view
    // `run` would start from.
    let mut predictor = BlockPredictor::new(cfg.clone())?;
    predictor.attach(stored, Utc::now());
    let attrs = predictor.attributes();

    if json {
        println!("{}", serde_json::to_string_pretty(&attrs)?);
        return Ok(());
    }

    println!("Predictor: {} ({})", cfg.name, cfg.unique_id());
    println!("  Entity: {}", cfg.entity);
    println!("  Blocks: {} x {} min", cfg.block_count(), cfg.block_length);
    if !has_state {
        println!("  No stored state yet.");
    }
    println!(
        "  Current block: {} ({})",
        predictor.calendar().block_label(attrs.rotation_anchor as usize),
        if attrs.current_block_active { "active" } else { "inactive" }
    );
    println!("  Probability: {:.1}%", attrs.probability * 100.0);
    println!("  Predicted: {}", if attrs.predicted_state { "on" } else { "off" });
    println!("{}", render_ascii_chart(predictor.calendar(), &attrs, cfg.threshold));
    Ok(())
}

fn reset_state(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = find_predictor(name)?;
    let store = StateStore::open_default()?;
    if store.remove(cfg.unique_id())? {
        println!("State reset: {}", cfg.name);
    } else {
        println!("No stored state for {}", cfg.name);
    }
    Ok(())
}
