use blockcast_core::{BlockPredictor, Config, PredictorConfig};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum PredictorAction {
    /// Add a predictor
    Add {
        /// Predictor name
        name: String,
        /// Observed binary signal (e.g. "binary_sensor.office_occupancy")
        #[arg(long)]
        entity: String,
        /// Minutes per block
        #[arg(long, default_value_t = 30)]
        block_length: u32,
        /// Minutes per learning cycle
        #[arg(long, default_value_t = blockcast_core::predictor::DEFAULT_PERIOD_MIN)]
        period: u32,
        /// Retention weight of the prior estimate, in [0, 1]
        #[arg(long, default_value_t = 0.8)]
        fading: f64,
        /// Classification cutoff, in [0, 1]
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
        /// Persistence key (generated if omitted)
        #[arg(long)]
        unique_id: Option<String>,
    },
    /// List predictors
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a predictor
    Remove {
        /// Predictor name
        name: String,
    },
    /// Validate the configuration file
    Validate,
    /// Get a predictor field
    Get {
        /// Predictor name
        name: String,
        /// Field (e.g. "threshold", "block_length")
        key: String,
    },
    /// Set a predictor field
    Set {
        /// Predictor name
        name: String,
        /// Field
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: PredictorAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PredictorAction::Add {
            name,
            entity,
            block_length,
            period,
            fading,
            threshold,
            unique_id,
        } => {
            let mut config = Config::load()?;
            let unique_id = unique_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let predictor = PredictorConfig::new(&name, entity, block_length, fading, threshold)
                .with_period(period)
                .with_unique_id(unique_id);
            config.add(predictor)?;
            config.save()?;
            println!("Predictor added: {name}");
        }
        PredictorAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.predictors)?);
            } else if config.predictors.is_empty() {
                println!("No predictors configured.");
            } else {
                for p in &config.predictors {
                    println!(
                        "{:<20} {:<36} {:>4}min x{:<4} fading={} threshold={}",
                        p.name,
                        p.entity,
                        p.block_length,
                        p.block_count(),
                        p.fading,
                        p.threshold
                    );
                }
            }
        }
        PredictorAction::Remove { name } => {
            let mut config = Config::load()?;
            let removed = config.remove(&name)?;
            config.save()?;
            println!("Predictor removed: {} ({})", removed.name, removed.unique_id());
        }
        PredictorAction::Validate => {
            // Loading validates the file as a whole; building each predictor
            // checks it the way `run` will.
            let config = Config::load()?;
            for p in &config.predictors {
                BlockPredictor::new(p.clone())?;
            }
            println!("ok: {} predictor(s)", config.predictors.len());
        }
        PredictorAction::Get { name, key } => {
            let config = Config::load()?;
            if config.find(&name).is_none() {
                return Err(format!("unknown predictor: {name}").into());
            }
            match config.get(&name, &key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        PredictorAction::Set { name, key, value } => {
            let mut config = Config::load()?;
            config.set(&name, &key, &value)?;
            config.save()?;
            println!("ok");
        }
    }
    Ok(())
}
