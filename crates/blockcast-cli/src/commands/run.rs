//! Live mode: attach every configured predictor and feed it from stdin.
//!
//! Each input line is `<entity> <state>`, e.g. `binary_sensor.office on`.
//! Prediction changes are printed as JSON lines; state is persisted after
//! every published change.
//!
//! State files are small and written inline on each predictor's task, so
//! writes for one predictor land in publish order.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use blockcast_core::runtime::{SignalSender, SystemClock};
use blockcast_core::{
    attach, signal_channel, BlockPredictor, Config, Event, PredictorAttributes, PredictorHandle,
    SignalState, StateStore,
};

const SIGNAL_BUFFER: usize = 64;

struct Attached {
    entity: String,
    sender: SignalSender,
    handle: PredictorHandle,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_attached())
}

async fn run_attached() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    if config.predictors.is_empty() {
        return Err("no predictors configured; add one with `blockcast predictor add`".into());
    }

    let store = StateStore::open_default()?;
    let clock = Arc::new(SystemClock);
    let mut attached = Vec::with_capacity(config.predictors.len());

    for cfg in &config.predictors {
        let predictor = BlockPredictor::new(cfg.clone())?;
        let persisted = store.load(cfg.unique_id())?;
        let (sender, subscription) = signal_channel(SIGNAL_BUFFER);
        let publisher = persisting_publisher(
            store.clone(),
            cfg.name.clone(),
            cfg.unique_id().to_string(),
        );
        let handle = attach(predictor, persisted, subscription, publisher, Arc::clone(&clock));
        attached.push(Attached {
            entity: cfg.entity.clone(),
            sender,
            handle,
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => route(&attached, &line).await,
                None => {
                    info!("Input closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    for Attached { sender, handle, .. } in attached {
        drop(sender);
        let name = handle.name().to_string();
        if let Err(e) = handle.detach().await {
            warn!(predictor = %name, error = %e, "Detach failed");
        }
    }
    Ok(())
}

/// Send one `<entity> <state>` line to every predictor observing the entity.
async fn route(attached: &[Attached], line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }
    let mut parts = line.split_whitespace();
    let (Some(entity), Some(raw), None) = (parts.next(), parts.next(), parts.next()) else {
        warn!(line, "Expected `<entity> <state>`");
        return;
    };
    let state: SignalState = raw.parse().unwrap_or(SignalState::Unknown);

    let mut routed = 0;
    for target in attached.iter().filter(|a| a.entity == entity) {
        match target.sender.notify(state).await {
            Ok(()) => routed += 1,
            Err(e) => warn!(predictor = %target.handle.name(), error = %e, "Signal dropped"),
        }
    }
    if routed == 0 {
        warn!(entity, "No predictor observes this entity");
    }
}

fn persisting_publisher(
    store: StateStore,
    name: String,
    unique_id: String,
) -> impl FnMut(&PredictorAttributes, &[Event]) + Send + 'static {
    move |attrs: &PredictorAttributes, events: &[Event]| {
        if let Err(e) = store.save(&unique_id, attrs) {
            warn!(predictor = %name, error = %e, "Failed to persist state");
        }
        for event in events {
            if matches!(
                event,
                Event::PredictorAttached { .. } | Event::PredictionChanged { .. }
            ) {
                let line = serde_json::json!({ "predictor": name, "event": event });
                println!("{line}");
            }
        }
    }
}
