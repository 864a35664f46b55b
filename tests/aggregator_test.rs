//! Metrics Aggregator Tests
//!
//! Counter correctness, rejection paths and snapshot consistency under
//! concurrent writers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use trueno_ab::experiment::Experiment;
use trueno_ab::metrics::{EventType, MetricsAggregator, MetricsState};
use trueno_ab::{Error, ExperimentEngine};

fn experiment() -> Experiment {
    Experiment::builder("checkout")
        .variant("control", 1.0)
        .variant("one-click", 1.0)
        .variant("guest", 1.0)
        .control("control")
        .build()
        .unwrap()
}

// =============================================================================
// Counter Correctness
// =============================================================================

#[test]
#[allow(clippy::cast_precision_loss)]
fn test_counts_and_revenue() {
    let engine = ExperimentEngine::new(experiment());
    let amounts = [19.99, 5.01, 75.0];

    for _ in 0..40 {
        engine.record("one-click", EventType::Visit, None).unwrap();
    }
    for amount in amounts {
        engine.record("one-click", EventType::Convert, Some(amount)).unwrap();
    }

    let metrics = engine.metrics("one-click").unwrap();
    assert_eq!(metrics.visitors(), 40);
    assert_eq!(metrics.conversions(), 3);
    assert!((metrics.revenue() - 100.0).abs() < 1e-9);
    assert!((metrics.conversion_rate() - 3.0 / 40.0).abs() < f64::EPSILON);
    assert!((metrics.avg_order_value() - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_zero_visitors_rate_is_zero() {
    let engine = ExperimentEngine::new(experiment());
    let metrics = engine.metrics("guest").unwrap();
    assert_eq!(metrics.state(), MetricsState::Uninitialized);
    assert!(metrics.conversion_rate().abs() < f64::EPSILON);
}

#[test]
fn test_convert_without_value_adds_no_revenue() {
    let engine = ExperimentEngine::new(experiment());
    engine.record("guest", "convert", None).unwrap();
    let metrics = engine.metrics("guest").unwrap();
    assert_eq!(metrics.conversions(), 1);
    assert!(metrics.revenue().abs() < f64::EPSILON);
}

#[test]
fn test_custom_events_accumulate_revenue() {
    let engine = ExperimentEngine::new(experiment());
    engine.record("guest", "upsell", Some(12.0)).unwrap();
    engine.record("guest", "newsletter_signup", None).unwrap();

    let metrics = engine.metrics("guest").unwrap();
    assert_eq!(metrics.visitors(), 0);
    assert_eq!(metrics.conversions(), 0);
    assert_eq!(metrics.custom_events(), 2);
    assert!((metrics.revenue() - 12.0).abs() < f64::EPSILON);
    assert_eq!(metrics.state(), MetricsState::Active);
}

// =============================================================================
// Rejection
// =============================================================================

#[test]
fn test_unknown_variant_rejected() {
    let engine = ExperimentEngine::new(experiment());
    engine.record("control", "visit", None).unwrap();
    let before = engine.snapshot();

    let err = engine
        .record("not-a-real-variant", "convert", Some(10.0))
        .unwrap_err();

    match err {
        Error::UnknownVariant {
            experiment,
            variant_id,
        } => {
            assert_eq!(experiment, "checkout");
            assert_eq!(variant_id, "not-a-real-variant");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(before.entries(), engine.snapshot().entries());
}

#[test]
fn test_negative_value_rejected() {
    let engine = ExperimentEngine::new(experiment());
    let err = engine.record("control", "convert", Some(-5.0)).unwrap_err();
    assert!(matches!(err, Error::InvalidEvent(_)));
    assert_eq!(engine.metrics("control").unwrap().conversions(), 0);
}

#[test]
fn test_metrics_lookup_unknown_variant() {
    let engine = ExperimentEngine::new(experiment());
    assert!(matches!(
        engine.metrics("missing"),
        Err(Error::UnknownVariant { .. })
    ));
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_reinitializes_all_variants() {
    let engine = ExperimentEngine::new(experiment());
    engine.record("control", "visit", None).unwrap();
    engine.record("one-click", "convert", Some(3.0)).unwrap();

    engine.reset();

    for (_, metrics) in engine.snapshot().entries() {
        assert_eq!(metrics.state(), MetricsState::Uninitialized);
        assert_eq!(metrics.events(), 0);
    }
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
#[allow(clippy::cast_precision_loss)]
fn test_concurrent_records_are_not_lost() {
    const THREADS: usize = 8;
    const VISITS: u64 = 1_000;
    const CONVERSIONS: u64 = 100;

    let aggregator = Arc::new(MetricsAggregator::new(Arc::new(experiment())));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let aggregator = Arc::clone(&aggregator);
            thread::spawn(move || {
                let variant = ["control", "one-click", "guest"][t % 3];
                for _ in 0..VISITS {
                    aggregator.record(variant, EventType::Visit, None).unwrap();
                }
                for _ in 0..CONVERSIONS {
                    aggregator.record(variant, EventType::Convert, Some(2.5)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = aggregator.snapshot();
    assert_eq!(snapshot.total_visitors(), THREADS as u64 * VISITS);
    let conversions: u64 = snapshot.entries().iter().map(|(_, m)| m.conversions()).sum();
    assert_eq!(conversions, THREADS as u64 * CONVERSIONS);
    let revenue: f64 = snapshot.entries().iter().map(|(_, m)| m.revenue()).sum();
    assert!((revenue - 2.5 * (THREADS as u64 * CONVERSIONS) as f64).abs() < 1e-6);
}

#[test]
#[allow(clippy::cast_precision_loss)]
fn test_snapshots_never_observe_torn_events() {
    let engine = Arc::new(ExperimentEngine::new(experiment()));
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = ["control", "one-click", "guest"]
        .into_iter()
        .map(|variant| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..5_000 {
                    let event = if i % 4 == 0 { "convert" } else { "visit" };
                    engine.record(variant, event, Some(1.0)).unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut checked = 0_u64;
            loop {
                let finished = done.load(Ordering::Acquire);
                for (_, m) in engine.snapshot().entries() {
                    // Each event bumps `events` together with exactly one counter.
                    assert_eq!(m.events(), m.visitors() + m.conversions());
                    assert!((m.revenue() - m.conversions() as f64).abs() < 1e-9);
                }
                checked += 1;
                if finished {
                    break checked;
                }
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Release);
    assert!(reader.join().unwrap() > 0);

    let events: u64 = engine.snapshot().entries().iter().map(|(_, m)| m.events()).sum();
    assert_eq!(events, 15_000);
}
