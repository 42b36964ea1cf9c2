use super::*;

/// Helper to create a sample at a millisecond offset from a base instant
fn sample_at(base: Instant, offset_ms: u64, frequency_hz: f32) -> PeakSample {
    PeakSample {
        at: base + Duration::from_millis(offset_ms),
        magnitude_db: -30.0,
        frequency_hz,
    }
}

/// Helper to create a classifier with the default thresholds
fn create_classifier() -> GestureClassifier {
    GestureClassifier::new(&ClassifierConfig::default())
}

/// Invert the smoothing step: the raw reading that makes the filter land on
/// `target` when the previous smoothed value is `prev` (weight 0.7)
fn raw_for_smoothed(prev: f32, target: f32) -> f32 {
    (target - 0.3 * prev) / 0.7
}

/// Drive a fresh classifier to lastAccepted == 18000.0 with one seed sample
/// at offset 0. The seed passes the gate (first sample is always eligible)
/// and the seed case of the filter stores the raw value unchanged.
fn classifier_at_18000(base: Instant) -> GestureClassifier {
    let mut classifier = create_classifier();
    let outcome = classifier
        .process(&sample_at(base, 0, 18_000.0))
        .unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(decision.state, GestureState::Approaching);
        }
        other => panic!("Expected seed decision, got {:?}", other),
    }
    assert_eq!(classifier.last_accepted_hz(), 18_000.0);
    classifier
}

#[test]
fn test_first_sample_emits_decision() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    // lastAccepted starts at 0.0, so any real carrier reading crosses the
    // motion threshold on the first eligible tick
    let outcome = classifier.process(&sample_at(base, 0, 18_000.0)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(decision.state, GestureState::Approaching);
            assert_eq!(decision.smoothed_hz, 18_000.0);
            assert_eq!(decision.delta_hz, 18_000.0);
            assert_eq!(decision.timestamp_ms, 0);
        }
        other => panic!("Expected a decision for the first sample, got {:?}", other),
    }
}

#[test]
fn test_approaching_boundary() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Smoothed value 18005.1: change = 5.1 > 5.0
    let raw = raw_for_smoothed(18_000.0, 18_005.1);
    let outcome = classifier.process(&sample_at(base, 600, raw)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(
                decision.state,
                GestureState::Approaching,
                "Change just past the motion threshold must report Approaching"
            );
            assert!((decision.delta_hz - 5.1).abs() < 0.01);
        }
        other => panic!("Expected Approaching, got {:?}", other),
    }
}

#[test]
fn test_receding_boundary() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Smoothed value 17994.9: change = -5.1 < -5.0
    let raw = raw_for_smoothed(18_000.0, 17_994.9);
    let outcome = classifier.process(&sample_at(base, 600, raw)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(
                decision.state,
                GestureState::Receding,
                "Change just past the negative motion threshold must report Receding"
            );
            assert!((decision.delta_hz + 5.1).abs() < 0.01);
        }
        other => panic!("Expected Receding, got {:?}", other),
    }
}

#[test]
fn test_stationary_inside_hysteresis() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Smoothed value 18001.0: |change| = 1.0 < 3.0
    let raw = raw_for_smoothed(18_000.0, 18_001.0);
    let outcome = classifier.process(&sample_at(base, 600, raw)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(
                decision.state,
                GestureState::Stationary,
                "Change inside the hysteresis band must report Stationary"
            );
        }
        other => panic!("Expected Stationary, got {:?}", other),
    }
}

#[test]
fn test_dead_zone_emits_no_state() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Smoothed value 18004.0: change = 4.0, inside the dead zone [3.0, 5.0]
    let raw = raw_for_smoothed(18_000.0, 18_004.0);
    let outcome = classifier.process(&sample_at(base, 600, raw)).unwrap();
    match outcome {
        TickOutcome::Unchanged { delta_hz, .. } => {
            assert!(
                (delta_hz - 4.0).abs() < 0.01,
                "Dead-zone change should be ~4.0 Hz, got {}",
                delta_hz
            );
        }
        other => panic!("Expected no state for a dead-zone change, got {:?}", other),
    }
}

#[test]
fn test_dead_zone_updates_accepted_frequency() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Dead-zone tick lands the accepted frequency on ~18004.0
    let raw = raw_for_smoothed(18_000.0, 18_004.0);
    let outcome = classifier.process(&sample_at(base, 600, raw)).unwrap();
    assert!(matches!(outcome, TickOutcome::Unchanged { .. }));
    assert!((classifier.last_accepted_hz() - 18_004.0).abs() < 0.01);

    // A smoothed value of ~18008.0 is a 4 Hz step from 18004 (dead zone
    // again) but would be an 8 Hz step from 18000. Seeing Unchanged proves
    // the dead-zone tick advanced the accepted frequency.
    let raw = raw_for_smoothed(classifier.last_accepted_hz(), 18_008.0);
    let outcome = classifier.process(&sample_at(base, 1_200, raw)).unwrap();
    match outcome {
        TickOutcome::Unchanged { delta_hz, .. } => {
            assert!((delta_hz - 4.0).abs() < 0.05);
        }
        other => panic!(
            "Expected dead zone measured against the updated frequency, got {:?}",
            other
        ),
    }
}

#[test]
fn test_debounce_suppresses_second_sample() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // 100 ms after the first decision, well past the motion threshold
    let outcome = classifier.process(&sample_at(base, 100, 18_020.0)).unwrap();
    match outcome {
        TickOutcome::Debounced { smoothed_hz, .. } => {
            // Smoothing still ran: 0.7 * 18020 + 0.3 * 18000
            assert!((smoothed_hz - 18_014.0).abs() < 0.01);
        }
        other => panic!("Expected debounce suppression, got {:?}", other),
    }

    // Accepted frequency and decision clock must still be from the first
    // decision. At 550 ms the gate reopens only if the clock stayed at 0.
    assert_eq!(classifier.last_accepted_hz(), 18_000.0);
    let outcome = classifier.process(&sample_at(base, 550, 18_014.0)).unwrap();
    assert!(
        matches!(outcome, TickOutcome::Decision(_) | TickOutcome::Unchanged { .. }),
        "Gate must reopen 550 ms after the first decision, got {:?}",
        outcome
    );
}

#[test]
fn test_exact_debounce_boundary_is_suppressed() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Elapsed exactly equal to the debounce interval: still inside the window
    let outcome = classifier.process(&sample_at(base, 500, 18_020.0)).unwrap();
    assert!(
        matches!(outcome, TickOutcome::Debounced { .. }),
        "Gate requires strictly more than the debounce interval, got {:?}",
        outcome
    );

    let outcome = classifier.process(&sample_at(base, 501, 18_020.0)).unwrap();
    assert!(
        !matches!(outcome, TickOutcome::Debounced { .. }),
        "Gate must open one tick past the interval, got {:?}",
        outcome
    );
}

#[test]
fn test_stationary_convergence_under_constant_input() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    // Constant carrier at 10 Hz cadence: the seed decision fires, then every
    // later gate pass sees change == 0 and reports Stationary
    let mut decisions = Vec::new();
    for i in 0..13 {
        let outcome = classifier
            .process(&sample_at(base, i * 100, 18_000.0))
            .unwrap();
        if let TickOutcome::Decision(decision) = outcome {
            decisions.push(decision);
        }
    }

    assert_eq!(
        decisions.len(),
        3,
        "Expected decisions at 0, 600 and 1200 ms, got {:?}",
        decisions
    );
    assert_eq!(decisions[0].state, GestureState::Approaching);
    assert_eq!(decisions[1].state, GestureState::Stationary);
    assert_eq!(decisions[2].state, GestureState::Stationary);
    assert_eq!(decisions[1].delta_hz, 0.0);

    // Debounce property: emitted decisions are at least 500 ms apart
    for pair in decisions.windows(2) {
        assert!(
            pair[1].timestamp_ms - pair[0].timestamp_ms > 500,
            "Decisions {} ms apart violate the debounce interval",
            pair[1].timestamp_ms - pair[0].timestamp_ms
        );
    }
}

#[test]
fn test_nan_frequency_rejected_without_state_change() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    let err = classifier
        .process(&sample_at(base, 600, f32::NAN))
        .unwrap_err();
    assert!(
        matches!(err, SampleError::NonFinite { .. }),
        "Expected NonFinite, got {:?}",
        err
    );

    // Neither the smoothing history nor the accepted frequency moved
    assert_eq!(classifier.history_len(), 1);
    assert_eq!(classifier.last_accepted_hz(), 18_000.0);

    // The next valid sample measures against the untouched state
    let outcome = classifier.process(&sample_at(base, 700, 18_000.0)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(decision.state, GestureState::Stationary);
            assert_eq!(decision.delta_hz, 0.0);
        }
        other => panic!("Expected Stationary after rejected sample, got {:?}", other),
    }
}

#[test]
fn test_infinite_frequency_rejected() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    let err = classifier
        .process(&sample_at(base, 0, f32::INFINITY))
        .unwrap_err();
    assert!(matches!(err, SampleError::NonFinite { .. }));

    // A rejected first sample must not seed the filter or the origin
    let outcome = classifier.process(&sample_at(base, 100, 18_000.0)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(decision.smoothed_hz, 18_000.0, "Seed case must still apply");
            assert_eq!(decision.timestamp_ms, 0, "Origin starts at the first valid sample");
        }
        other => panic!("Expected seed decision, got {:?}", other),
    }
}

#[test]
fn test_negative_frequency_rejected() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    let err = classifier
        .process(&sample_at(base, 0, -440.0))
        .unwrap_err();
    match err {
        SampleError::Negative { value } => assert_eq!(value, -440.0),
        other => panic!("Expected Negative, got {:?}", other),
    }
}

#[test]
fn test_out_of_order_timestamp_rejected() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    classifier.process(&sample_at(base, 600, 18_000.0)).unwrap();

    let err = classifier
        .process(&sample_at(base, 400, 18_001.0))
        .unwrap_err();
    match err {
        SampleError::NonMonotonic { regression_ms } => {
            assert_eq!(regression_ms, 200);
        }
        other => panic!("Expected NonMonotonic, got {:?}", other),
    }

    // Classifier state is untouched; a later in-order sample processes fine
    assert_eq!(classifier.history_len(), 1);
    let outcome = classifier.process(&sample_at(base, 700, 18_000.0)).unwrap();
    assert_eq!(
        outcome,
        TickOutcome::Debounced {
            smoothed_hz: 18_000.0,
            timestamp_ms: 100,
        }
    );
}

#[test]
fn test_equal_timestamps_accepted() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    classifier.process(&sample_at(base, 0, 18_000.0)).unwrap();

    // Same instant again: valid (non-decreasing), but inside the window
    let outcome = classifier.process(&sample_at(base, 0, 18_010.0)).unwrap();
    assert!(
        matches!(outcome, TickOutcome::Debounced { .. }),
        "Equal timestamps are in order, got {:?}",
        outcome
    );
}

#[test]
fn test_timestamp_ms_counts_from_first_valid_sample() {
    let base = Instant::now();
    let mut classifier = create_classifier();

    let first = classifier.process(&sample_at(base, 0, 18_000.0)).unwrap();
    let second = classifier.process(&sample_at(base, 600, 18_000.0)).unwrap();

    match (first, second) {
        (TickOutcome::Decision(d1), TickOutcome::Decision(d2)) => {
            assert_eq!(d1.timestamp_ms, 0);
            assert_eq!(d2.timestamp_ms, 600);
        }
        other => panic!("Expected two decisions, got {:?}", other),
    }
}

#[test]
fn test_smoothing_advances_during_debounce() {
    let base = Instant::now();
    let mut classifier = classifier_at_18000(base);

    // Four suppressed ticks still push the smoothed estimate toward the
    // new frequency, so the gate pass at 600 ms sees most of the step
    for offset in [100, 200, 300, 400] {
        let outcome = classifier
            .process(&sample_at(base, offset, 18_020.0))
            .unwrap();
        assert!(matches!(outcome, TickOutcome::Debounced { .. }));
    }
    assert_eq!(classifier.history_len(), 5);

    let outcome = classifier.process(&sample_at(base, 600, 18_020.0)).unwrap();
    match outcome {
        TickOutcome::Decision(decision) => {
            assert_eq!(decision.state, GestureState::Approaching);
            assert!(
                decision.delta_hz > 19.0,
                "Suppressed ticks must have advanced smoothing, got delta {}",
                decision.delta_hz
            );
        }
        other => panic!("Expected Approaching after convergence, got {:?}", other),
    }
}
