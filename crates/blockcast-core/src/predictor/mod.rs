mod buffer;
mod calendar;
mod chart;
mod classifier;
mod config;
mod engine;
mod signal;
mod smoother;
mod state;

pub use buffer::ProbabilityBuffer;
pub use calendar::TimeBlockCalendar;
pub use chart::render_ascii_chart;
pub use classifier::ThresholdClassifier;
pub use config::{PredictorConfig, DEFAULT_PERIOD_MIN};
pub use engine::{BlockPredictor, PredictorInput};
pub use signal::SignalState;
pub use smoother::ExponentialSmoother;
pub use state::PredictorAttributes;
