//! # blockcast Core Library
//!
//! This library provides the core logic of blockcast, a time-block
//! probability predictor. A predictor watches one binary signal, learns for
//! every recurring block of the day how often the signal has been active,
//! and predicts whether it will be active in the current block.
//!
//! ## Architecture
//!
//! - **Predictor**: a wall-clock-based state machine ([`BlockPredictor`])
//!   fed with signal changes and block-boundary ticks
//! - **Runtime**: tokio host that attaches predictors, owns their signal
//!   subscriptions and boundary timers, and publishes state
//! - **Storage**: TOML predictor configuration and JSON state files
//! - **Replay**: offline driver for recorded observations
//!
//! ## Key Components
//!
//! - [`BlockPredictor`]: smoothing, rotation and classification
//! - [`TimeBlockCalendar`]: block index and boundary math
//! - [`runtime::attach`]: run a predictor against live inputs
//! - [`Config`] / [`StateStore`]: persistence

pub mod error;
pub mod events;
pub mod predictor;
pub mod replay;
pub mod runtime;
pub mod storage;

pub use error::{ConfigError, CoreError, StateError, StorageError};
pub use events::Event;
pub use predictor::{
    render_ascii_chart, BlockPredictor, PredictorAttributes, PredictorConfig, PredictorInput,
    ProbabilityBuffer, SignalState, TimeBlockCalendar,
};
pub use replay::{parse_observations, Observation, Replayer};
pub use runtime::{attach, signal_channel, PredictorHandle, StatePublisher};
pub use storage::{Config, StateStore};
