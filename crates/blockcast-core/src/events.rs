use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::predictor::SignalState;

/// Every state change of a predictor produces an Event.
/// Hosts receive them alongside the updated attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Predictor was attached and aligned to the current block.
    PredictorAttached {
        block_index: usize,
        /// Whether persisted state was restored (false when starting fresh
        /// or when persisted state was rejected).
        restored: bool,
        /// Number of blocks the buffer was rotated to catch up.
        shift: usize,
        predicted_state: bool,
        at: DateTime<Utc>,
    },
    /// Observed signal reported a new raw state.
    SignalObserved {
        state: SignalState,
        block_active: bool,
        at: DateTime<Utc>,
    },
    /// A block ended and its probability was smoothed.
    BlockCompleted {
        block_index: usize,
        observed: bool,
        probability: f64,
        at: DateTime<Utc>,
    },
    /// Published prediction flipped.
    PredictionChanged {
        predicted_state: bool,
        probability: f64,
        at: DateTime<Utc>,
    },
    /// Predictor was detached; no further events follow.
    PredictorDetached {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::PredictorAttached { at, .. }
            | Event::SignalObserved { at, .. }
            | Event::BlockCompleted { at, .. }
            | Event::PredictionChanged { at, .. }
            | Event::PredictorDetached { at } => *at,
        }
    }
}
