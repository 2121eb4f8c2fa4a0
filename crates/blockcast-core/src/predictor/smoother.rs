//! Exponential smoothing of the block that is ending.

use super::buffer::ProbabilityBuffer;

/// Decimal places kept after each update.
const PRECISION: i32 = 6;

/// Blends the latest observation into the prior estimate.
///
/// `fading` is the retention weight of the prior: 1.0 freezes the buffer,
/// 0.0 replaces it with the last observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother {
    fading: f64,
}

impl ExponentialSmoother {
    pub fn new(fading: f64) -> Self {
        Self { fading }
    }

    pub fn fading(&self) -> f64 {
        self.fading
    }

    /// Smoothed probability for one block.
    pub fn smooth(&self, observed: bool, prior: f64) -> f64 {
        let observed = if observed { 1.0 } else { 0.0 };
        round_to_precision(observed * (1.0 - self.fading) + prior * self.fading)
    }

    /// Update the current slot of `buffer` and return the new value.
    pub fn apply(&self, buffer: &mut ProbabilityBuffer, observed: bool) -> f64 {
        let updated = self.smooth(observed, buffer.current());
        buffer.set_current(updated);
        updated
    }
}

fn round_to_precision(value: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    ((value * scale).round() / scale).clamp(0.0, 1.0)
}
