//! Cyclic per-block probability buffer.
//!
//! Index 0 always denotes the current block and index `i` the block `i`
//! blocks from now. The buffer is allocated once with `block_count` slots and
//! is only ever rotated or written in place.

use crate::error::StateError;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBuffer {
    values: Vec<f64>,
    /// Calendar block index the buffer was last aligned to.
    anchor: usize,
}

impl ProbabilityBuffer {
    /// A zeroed buffer anchored at block 0.
    pub fn new(block_count: usize) -> Self {
        Self {
            values: vec![0.0; block_count],
            anchor: 0,
        }
    }

    /// Rebuild a buffer from persisted parts, checking shape and ranges.
    pub fn from_parts(
        values: Vec<f64>,
        anchor: i64,
        block_count: usize,
    ) -> Result<Self, StateError> {
        if values.len() != block_count {
            return Err(StateError::LengthMismatch {
                expected: block_count,
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(StateError::ProbabilityOutOfRange { index, value });
        }
        if anchor < 0 || anchor >= block_count as i64 {
            return Err(StateError::AnchorOutOfRange {
                anchor,
                block_count,
            });
        }
        Ok(Self {
            values,
            anchor: anchor as usize,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Probability of the current block.
    pub fn current(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    /// Probability of the block `offset` blocks from now.
    pub fn get(&self, offset: usize) -> Option<f64> {
        self.values.get(offset).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Rotate left by `shift` positions, for any sign or magnitude.
    ///
    /// Returns the normalised shift in `0..len`.
    pub fn rotate_left(&mut self, shift: i64) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let normalized = shift.rem_euclid(self.values.len() as i64) as usize;
        self.values.rotate_left(normalized);
        normalized
    }

    /// Realign so index 0 is `current_index`, and move the anchor there.
    ///
    /// Returns the normalised shift that was applied.
    pub fn align(&mut self, current_index: usize) -> usize {
        let shift = current_index as i64 - self.anchor as i64;
        let applied = self.rotate_left(shift);
        self.anchor = current_index;
        applied
    }

    /// Overwrite the current block's probability.
    pub(crate) fn set_current(&mut self, value: f64) {
        if let Some(slot) = self.values.first_mut() {
            *slot = value;
        }
    }
}
