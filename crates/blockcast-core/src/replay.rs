//! Offline replay of recorded signal observations.
//!
//! Drives a predictor through a history of timestamped signal changes,
//! firing every block boundary that falls between them exactly as the live
//! runtime would. Input is JSON lines:
//!
//! ```text
//! {"at":"2024-05-01T08:05:00Z","state":"on"}
//! {"at":"2024-05-01T08:40:00Z","state":"off"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::predictor::{BlockPredictor, PredictorAttributes, PredictorInput, SignalState};

/// One recorded signal change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub at: DateTime<Utc>,
    pub state: SignalState,
}

/// Parse JSON-lines observations. Blank lines and `#` comments are skipped.
pub fn parse_observations(input: &str) -> Result<Vec<Observation>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| CoreError::Replay {
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Feeds observations to a predictor in time order.
#[derive(Debug)]
pub struct Replayer {
    predictor: BlockPredictor,
    cursor: DateTime<Utc>,
    observed: usize,
}

impl Replayer {
    /// Attach `predictor` at `at` and start replaying from there.
    pub fn start(
        mut predictor: BlockPredictor,
        persisted: Option<PredictorAttributes>,
        at: DateTime<Utc>,
    ) -> (Self, Event) {
        let attached = predictor.attach(persisted, at);
        (
            Self {
                predictor,
                cursor: at,
                observed: 0,
            },
            attached,
        )
    }

    pub fn predictor(&self) -> &BlockPredictor {
        &self.predictor
    }

    pub fn into_predictor(self) -> BlockPredictor {
        self.predictor
    }

    /// Time up to which the replay has progressed.
    pub fn cursor(&self) -> DateTime<Utc> {
        self.cursor
    }

    /// Fire every boundary in `(cursor, until]`.
    pub fn advance_to(&mut self, until: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            let boundary = self.predictor.next_boundary(self.cursor);
            if boundary > until {
                break;
            }
            events.extend(
                self.predictor
                    .handle(PredictorInput::BoundaryElapsed { at: boundary }, boundary),
            );
            self.cursor = boundary;
        }
        self.cursor = self.cursor.max(until);
        events
    }

    /// Apply one observation after firing the boundaries before it.
    ///
    /// # Errors
    ///
    /// Returns an error if the observation is earlier than the cursor.
    pub fn observe(&mut self, observation: Observation) -> Result<Vec<Event>> {
        self.observed += 1;
        if observation.at < self.cursor {
            return Err(CoreError::Replay {
                line: self.observed,
                message: format!(
                    "observation at {} is before {}",
                    observation.at.to_rfc3339(),
                    self.cursor.to_rfc3339()
                ),
            });
        }
        let mut events = self.advance_to(observation.at);
        events.extend(self.predictor.handle(
            PredictorInput::SignalChanged(observation.state),
            observation.at,
        ));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::PredictorConfig;
    use chrono::{Duration, TimeZone};

    fn predictor() -> BlockPredictor {
        BlockPredictor::new(PredictorConfig::new("p", "binary_sensor.p", 30, 0.5, 0.4)).unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_json_lines_with_comments() {
        let input = r#"
# kitchen motion
{"at":"2024-05-01T08:05:00Z","state":"on"}

{"at":"2024-05-01T08:40:00Z","state":"off"}
"#;
        let obs = parse_observations(input).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].state, SignalState::On);
        assert_eq!(obs[1].at, Utc.with_ymd_and_hms(2024, 5, 1, 8, 40, 0).unwrap());
    }

    #[test]
    fn reports_bad_line_number() {
        let input = "{\"at\":\"2024-05-01T08:05:00Z\",\"state\":\"on\"}\nnot json\n";
        match parse_observations(input) {
            Err(CoreError::Replay { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected replay error, got {other:?}"),
        }
    }

    #[test]
    fn fires_boundaries_between_observations() {
        let (mut replay, _) = Replayer::start(predictor(), None, day(1));
        replay
            .observe(Observation { at: day(1) + Duration::minutes(10), state: SignalState::On })
            .unwrap();
        let events = replay
            .observe(Observation { at: day(1) + Duration::minutes(95), state: SignalState::Off })
            .unwrap();
        let completed = events
            .iter()
            .filter(|e| matches!(e, Event::BlockCompleted { .. }))
            .count();
        assert_eq!(completed, 3);
        assert_eq!(replay.predictor().buffer().anchor(), 3);
        // Blocks 0, 1, 2 all saw the signal on (carried forward).
        assert_eq!(replay.predictor().buffer().get(45), Some(0.5));
        assert_eq!(replay.predictor().buffer().get(47), Some(0.5));
    }

    #[test]
    fn rejects_out_of_order_observation() {
        let (mut replay, _) = Replayer::start(predictor(), None, day(1) + Duration::hours(1));
        assert!(replay
            .observe(Observation { at: day(1), state: SignalState::On })
            .is_err());
    }

    #[test]
    fn two_day_scenario() {
        let (mut replay, _) = Replayer::start(predictor(), None, day(1));
        replay
            .observe(Observation { at: day(1) + Duration::minutes(5), state: SignalState::On })
            .unwrap();
        replay
            .observe(Observation { at: day(1) + Duration::minutes(20), state: SignalState::Off })
            .unwrap();
        replay.advance_to(day(2));
        assert_eq!(replay.predictor().probability(), 0.5);
        assert!(replay.predictor().predicted_state());

        replay.advance_to(day(2) + Duration::minutes(30));
        replay.advance_to(day(3));
        assert_eq!(replay.predictor().probability(), 0.25);
        assert!(!replay.predictor().predicted_state());
    }
}
