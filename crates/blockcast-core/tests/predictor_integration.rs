//! Integration tests for the predictor engine and its persistence.

use blockcast_core::{
    BlockPredictor, Event, PredictorConfig, PredictorInput, SignalState, StateStore,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()
}

fn scenario_config() -> PredictorConfig {
    PredictorConfig::new("desk", "binary_sensor.desk_presence", 30, 0.5, 0.4)
}

/// Fire every boundary from `from` (exclusive) to `to` (inclusive).
fn run_boundaries(p: &mut BlockPredictor, from: DateTime<Utc>, to: DateTime<Utc>) {
    let mut cursor = from;
    loop {
        let boundary = p.next_boundary(cursor);
        if boundary > to {
            break;
        }
        p.handle(PredictorInput::BoundaryElapsed { at: boundary }, boundary);
        cursor = boundary;
    }
}

#[test]
fn test_two_day_scenario() {
    let mut p = BlockPredictor::new(scenario_config()).unwrap();
    assert_eq!(p.calendar().block_count(), 48);
    p.attach(None, day(1));

    // Day 1, block 0: signal observed active.
    p.handle(PredictorInput::SignalChanged(SignalState::On), day(1) + Duration::minutes(3));
    p.handle(PredictorInput::SignalChanged(SignalState::Off), day(1) + Duration::minutes(9));

    let events = p.handle(
        PredictorInput::BoundaryElapsed { at: day(1) + Duration::minutes(30) },
        day(1) + Duration::minutes(30),
    );
    assert_eq!(
        events[0],
        Event::BlockCompleted {
            block_index: 0,
            observed: true,
            probability: 0.5,
            at: day(1) + Duration::minutes(30),
        }
    );

    run_boundaries(&mut p, day(1) + Duration::minutes(30), day(2));
    assert_eq!(p.probability(), 0.5);
    assert!(p.predicted_state(), "0.5 >= 0.4");

    // Day 2, block 0: signal inactive.
    run_boundaries(&mut p, day(2), day(2) + Duration::minutes(30));
    run_boundaries(&mut p, day(2) + Duration::minutes(30), day(3));
    assert_eq!(p.probability(), 0.25);
    assert!(!p.predicted_state(), "0.25 < 0.4");
}

#[test]
fn test_threshold_boundary_is_inclusive() {
    let cfg = PredictorConfig::new("inclusive", "binary_sensor.x", 60, 0.5, 0.5);
    let mut p = BlockPredictor::new(cfg).unwrap();
    p.attach(None, day(1));
    p.handle(PredictorInput::SignalChanged(SignalState::On), day(1));
    p.handle(PredictorInput::SignalChanged(SignalState::Off), day(1) + Duration::minutes(1));
    run_boundaries(&mut p, day(1), day(2));
    assert_eq!(p.probability(), 0.5);
    assert!(p.predicted_state());
}

#[test]
fn test_restore_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path()).unwrap();
    let now = day(1) + Duration::hours(7) + Duration::minutes(12);

    let mut p = BlockPredictor::new(scenario_config()).unwrap();
    p.attach(None, day(1));
    let mut cursor = day(1);
    for h in 0..7 {
        let at = day(1) + Duration::hours(h) + Duration::minutes(5);
        run_boundaries(&mut p, cursor, at);
        p.handle(PredictorInput::SignalChanged(SignalState::On), at);
        p.handle(PredictorInput::SignalChanged(SignalState::Off), at + Duration::minutes(1));
        cursor = at + Duration::minutes(1);
    }
    run_boundaries(&mut p, cursor, now);
    p.handle(PredictorInput::SignalChanged(SignalState::On), now);

    let saved = p.attributes();
    store.save(p.config().unique_id(), &saved).unwrap();

    let loaded = store.load("desk").unwrap();
    let mut fresh = BlockPredictor::new(scenario_config()).unwrap();
    let event = fresh.attach(loaded, now);
    assert!(matches!(event, Event::PredictorAttached { restored: true, shift: 0, .. }));
    assert_eq!(fresh.attributes(), saved);
}

#[test]
fn test_restore_catches_up_after_downtime() {
    let mut p = BlockPredictor::new(scenario_config()).unwrap();
    p.attach(None, day(1));
    p.handle(PredictorInput::SignalChanged(SignalState::On), day(1));
    p.handle(PredictorInput::SignalChanged(SignalState::Off), day(1));
    run_boundaries(&mut p, day(1), day(1) + Duration::minutes(30));
    let saved = p.attributes();
    assert_eq!(saved.rotation_anchor, 1);

    // Restart three days and two blocks later.
    let later = day(4) + Duration::minutes(75);
    let mut fresh = BlockPredictor::new(scenario_config()).unwrap();
    let event = fresh.attach(Some(saved), later);
    assert!(matches!(event, Event::PredictorAttached { block_index: 2, shift: 1, .. }));
    // Block 0 is now two blocks behind the current one.
    assert_eq!(fresh.buffer().get(46), Some(0.5));
}

#[test]
fn test_restore_wrong_length_reinitialises() {
    let small = PredictorConfig::new("desk", "binary_sensor.desk_presence", 60, 0.5, 0.4);
    let mut p = BlockPredictor::new(small).unwrap();
    p.attach(None, day(1));
    let saved = p.attributes();
    assert_eq!(saved.probabilities.len(), 24);

    let now = day(1) + Duration::minutes(100);
    let mut fresh = BlockPredictor::new(scenario_config()).unwrap();
    let event = fresh.attach(Some(saved), now);
    assert!(matches!(event, Event::PredictorAttached { restored: false, .. }));
    assert_eq!(fresh.attributes().probabilities.len(), 48);
    assert_eq!(fresh.buffer().anchor(), 3);
}
