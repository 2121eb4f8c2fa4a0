//! Published and persisted predictor attributes.

use serde::{Deserialize, Serialize};

use super::signal::SignalState;

/// Round-trippable attribute set of a predictor.
///
/// This is both what hosts see after every handled input and what is saved
/// for resumption after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorAttributes {
    /// Per-block probabilities, index 0 being the current block.
    pub probabilities: Vec<f64>,
    /// Calendar block index the probabilities were last aligned to.
    pub rotation_anchor: i64,
    /// Whether the signal was active at least once in the current block.
    #[serde(default)]
    pub current_block_active: bool,
    /// Last raw state reported by the signal.
    #[serde(default)]
    pub raw_observed_state: Option<SignalState>,
    /// Probability of the current block.
    #[serde(default)]
    pub probability: f64,
    /// Published prediction.
    #[serde(default)]
    pub predicted_state: bool,
}
