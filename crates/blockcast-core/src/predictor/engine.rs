//! Predictor engine implementation.
//!
//! The engine is a wall-clock-based state machine. It owns no timers or
//! threads: the host feeds it [`PredictorInput`]s together with the current
//! time and schedules the next boundary from [`BlockPredictor::next_boundary`].
//!
//! ## Input handling
//!
//! ```text
//! attach ──► restore + align + classify
//! SignalChanged(on)   ──► mark current block active
//! BoundaryElapsed     ──► smooth buffer[0] ─► align ─► classify
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut predictor = BlockPredictor::new(config)?;
//! predictor.attach(persisted, now);
//! predictor.handle(PredictorInput::SignalChanged(SignalState::On), now);
//! predictor.handle(PredictorInput::BoundaryElapsed { at: boundary }, boundary);
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::buffer::ProbabilityBuffer;
use super::calendar::TimeBlockCalendar;
use super::classifier::ThresholdClassifier;
use super::config::PredictorConfig;
use super::signal::SignalState;
use super::smoother::ExponentialSmoother;
use super::state::PredictorAttributes;
use crate::error::{ConfigError, StateError};
use crate::events::Event;

/// The two event sources a predictor reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictorInput {
    /// The observed signal reported a new raw state.
    SignalChanged(SignalState),
    /// The block boundary at `at` was reached.
    BoundaryElapsed { at: DateTime<Utc> },
}

/// Core predictor state machine.
#[derive(Debug, Clone)]
pub struct BlockPredictor {
    config: PredictorConfig,
    calendar: TimeBlockCalendar,
    smoother: ExponentialSmoother,
    classifier: ThresholdClassifier,
    buffer: ProbabilityBuffer,
    block_active: bool,
    raw_state: Option<SignalState>,
    predicted: bool,
}

impl BlockPredictor {
    /// Create a predictor with a zeroed buffer anchored at block 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PredictorConfig) -> Result<Self, ConfigError> {
        let calendar = TimeBlockCalendar::from_config(&config)?;
        let classifier = ThresholdClassifier::new(config.threshold);
        let buffer = ProbabilityBuffer::new(calendar.block_count());
        let predicted = classifier.classify(buffer.current());
        Ok(Self {
            smoother: ExponentialSmoother::new(config.fading),
            config,
            calendar,
            classifier,
            buffer,
            block_active: false,
            raw_state: None,
            predicted,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn calendar(&self) -> &TimeBlockCalendar {
        &self.calendar
    }

    pub fn buffer(&self) -> &ProbabilityBuffer {
        &self.buffer
    }

    /// Probability of the current block.
    pub fn probability(&self) -> f64 {
        self.buffer.current()
    }

    pub fn predicted_state(&self) -> bool {
        self.predicted
    }

    pub fn block_active(&self) -> bool {
        self.block_active
    }

    pub fn raw_state(&self) -> Option<SignalState> {
        self.raw_state
    }

    /// Instant of the next block boundary after `now`.
    pub fn next_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.calendar.next_boundary(now)
    }

    /// Snapshot of the published attribute set.
    pub fn attributes(&self) -> PredictorAttributes {
        PredictorAttributes {
            probabilities: self.buffer.as_slice().to_vec(),
            rotation_anchor: self.buffer.anchor() as i64,
            current_block_active: self.block_active,
            raw_observed_state: self.raw_state,
            probability: self.buffer.current(),
            predicted_state: self.predicted,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Bring the predictor up at `now`.
    ///
    /// Restores `persisted` when it passes integrity checks, otherwise starts
    /// from a zeroed buffer. Either way the buffer is aligned to the block
    /// containing `now` and the prediction recomputed.
    pub fn attach(&mut self, persisted: Option<PredictorAttributes>, now: DateTime<Utc>) -> Event {
        let restored = match persisted {
            Some(attrs) => match self.restore(&attrs, now) {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        predictor = %self.config.name,
                        error = %e,
                        "Rejected persisted state, reinitialising"
                    );
                    self.reset(now);
                    false
                }
            },
            None => false,
        };

        let block_index = self.calendar.current_block_index(now);
        let shift = self.buffer.align(block_index);
        self.predicted = self.classifier.classify(self.buffer.current());

        info!(
            predictor = %self.config.name,
            entity = %self.config.entity,
            block_index,
            shift,
            restored,
            predicted = self.predicted,
            "Predictor attached"
        );

        Event::PredictorAttached {
            block_index,
            restored,
            shift,
            predicted_state: self.predicted,
            at: now,
        }
    }

    /// Replace state with `attrs` without aligning or classifying.
    ///
    /// Leaves the predictor untouched when `attrs` fails integrity checks.
    pub(crate) fn restore(
        &mut self,
        attrs: &PredictorAttributes,
        now: DateTime<Utc>,
    ) -> Result<(), StateError> {
        let buffer = ProbabilityBuffer::from_parts(
            attrs.probabilities.clone(),
            attrs.rotation_anchor,
            self.calendar.block_count(),
        )?;
        // The activity flag belongs to the block it was recorded in; a signal
        // still on carries it across the boundaries missed while detached.
        let same_block = buffer.anchor() == self.calendar.current_block_index(now);
        self.buffer = buffer;
        self.raw_state = attrs.raw_observed_state;
        self.block_active = (same_block && attrs.current_block_active) || self.signal_on();
        Ok(())
    }

    /// Drop all learned state and anchor at the block containing `now`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.buffer = ProbabilityBuffer::new(self.calendar.block_count());
        self.buffer.align(self.calendar.current_block_index(now));
        self.block_active = false;
        self.raw_state = None;
        self.predicted = self.classifier.classify(self.buffer.current());
    }

    /// Re-anchor to the block containing `now` without completing a block.
    ///
    /// Used when the wall clock moved backwards, so no boundary elapsed.
    pub fn realign(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let current = self.calendar.current_block_index(now);
        if current == self.buffer.anchor() {
            return Vec::new();
        }
        let shift = self.buffer.align(current);
        if !self.signal_on() {
            self.block_active = false;
        }
        debug!(
            predictor = %self.config.name,
            block_index = current,
            shift,
            "Realigned to wall clock"
        );
        self.classify(now).into_iter().collect()
    }

    /// Single dispatch point for both event sources.
    pub fn handle(&mut self, input: PredictorInput, now: DateTime<Utc>) -> Vec<Event> {
        match input {
            PredictorInput::SignalChanged(state) => self.on_signal(state, now),
            PredictorInput::BoundaryElapsed { at } => self.on_boundary(at),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_signal(&mut self, state: SignalState, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        self.raw_state = Some(state);
        if state.is_active() && !self.block_active {
            self.block_active = true;
            events.extend(self.classify(now));
        }

        debug!(
            predictor = %self.config.name,
            state = %state,
            block_active = self.block_active,
            "Signal observed"
        );

        events.insert(
            0,
            Event::SignalObserved {
                state,
                block_active: self.block_active,
                at: now,
            },
        );
        events
    }

    fn on_boundary(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        let ended = self.buffer.anchor();
        let observed = self.block_active;
        let probability = self.smoother.apply(&mut self.buffer, observed);

        // Carry the flag into the next block while the signal is still on.
        if !self.signal_on() {
            self.block_active = false;
        }

        let current = self.calendar.current_block_index(at);
        let shift = self.buffer.align(current);

        debug!(
            predictor = %self.config.name,
            block_index = ended,
            observed,
            probability,
            next_block = current,
            shift,
            "Block completed"
        );

        events.push(Event::BlockCompleted {
            block_index: ended,
            observed,
            probability,
            at,
        });
        events.extend(self.classify(at));
        events
    }

    fn signal_on(&self) -> bool {
        self.raw_state.is_some_and(|s| s.is_active())
    }

    fn classify(&mut self, at: DateTime<Utc>) -> Option<Event> {
        let predicted = self.classifier.classify(self.buffer.current());
        if predicted == self.predicted {
            return None;
        }
        self.predicted = predicted;
        Some(Event::PredictionChanged {
            predicted_state: predicted,
            probability: self.buffer.current(),
            at,
        })
    }
}
