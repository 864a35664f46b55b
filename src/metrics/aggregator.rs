//! Metrics aggregator - the only mutation path for experiment counters

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use super::{EventType, VariantMetrics};
use crate::experiment::Experiment;
use crate::{Error, Result};

/// Thread-safe per-variant counter table for one experiment.
///
/// ## Design
///
/// One mutex guards the whole table (indexed by variant position). Writes
/// hold it only for a handful of additions, and reads copy the table out in
/// one acquisition, so a snapshot can never observe one event half-applied
/// or a mix of instants across variants.
#[derive(Debug)]
pub struct MetricsAggregator {
    experiment: Arc<Experiment>,
    table: Mutex<Vec<VariantMetrics>>,
}

impl MetricsAggregator {
    /// Create an aggregator with zeroed counters for every variant.
    #[must_use]
    pub fn new(experiment: Arc<Experiment>) -> Self {
        let table = vec![VariantMetrics::default(); experiment.variant_count()];
        Self {
            experiment,
            table: Mutex::new(table),
        }
    }

    /// Get the experiment these counters belong to.
    #[must_use]
    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    /// Record one event against a variant.
    ///
    /// `visit` increments visitors; `convert` increments conversions and adds
    /// `value` to revenue; custom events add `value` to revenue. A missing
    /// value counts as `0.0`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownVariant`] if the experiment has no such variant
    /// - [`Error::InvalidEvent`] if `value` is negative or non-finite
    ///
    /// Counters are left untouched on error.
    pub fn record(
        &self,
        variant_id: &str,
        event: impl Into<EventType>,
        value: Option<f64>,
    ) -> Result<()> {
        let slot = self
            .experiment
            .index_of(variant_id)
            .ok_or_else(|| Error::UnknownVariant {
                experiment: self.experiment.name().to_string(),
                variant_id: variant_id.to_string(),
            })?;

        let event = event.into();
        let amount = validate_value(&event, value)?;

        self.table.lock()[slot].apply(&event, amount);

        debug!(
            experiment = self.experiment.name(),
            variant = variant_id,
            event = %event,
            value = amount,
            "recorded event"
        );
        Ok(())
    }

    /// Get a copy of one variant's counters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariant`] if the experiment has no such variant.
    pub fn metrics(&self, variant_id: &str) -> Result<VariantMetrics> {
        let slot = self
            .experiment
            .index_of(variant_id)
            .ok_or_else(|| Error::UnknownVariant {
                experiment: self.experiment.name().to_string(),
                variant_id: variant_id.to_string(),
            })?;
        Ok(self.table.lock()[slot])
    }

    /// Copy every variant's counters as of one instant.
    ///
    /// Includes variants that never received an event (all-zero counters).
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (counters, taken_at) = {
            let table = self.table.lock();
            (table.clone(), Utc::now())
        };

        let entries = self
            .experiment
            .variants()
            .iter()
            .zip(counters)
            .map(|(variant, metrics)| (variant.id().to_string(), metrics))
            .collect();

        MetricsSnapshot { taken_at, entries }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.table.lock().fill(VariantMetrics::default());
        info!(experiment = self.experiment.name(), "metrics reset");
    }
}

fn validate_value(event: &EventType, value: Option<f64>) -> Result<f64> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(Error::InvalidEvent(format!(
            "'{event}' value must be a finite non-negative amount, got {v}"
        ))),
    }
}

/// Point-in-time copy of all variant counters, in experiment order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    taken_at: DateTime<Utc>,
    entries: Vec<(String, VariantMetrics)>,
}

impl MetricsSnapshot {
    /// Get the instant the snapshot was taken.
    #[must_use]
    pub const fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Get the `(variant_id, metrics)` pairs in experiment order.
    #[must_use]
    pub fn entries(&self) -> &[(String, VariantMetrics)] {
        &self.entries
    }

    /// Look up one variant's counters.
    #[must_use]
    pub fn get(&self, variant_id: &str) -> Option<&VariantMetrics> {
        self.entries
            .iter()
            .find(|(id, _)| id == variant_id)
            .map(|(_, metrics)| metrics)
    }

    /// Sum of visitors across all variants.
    #[must_use]
    pub fn total_visitors(&self) -> u64 {
        self.entries.iter().map(|(_, m)| m.visitors()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsState;

    fn aggregator() -> MetricsAggregator {
        let experiment = Experiment::builder("exp")
            .variant("control", 1.0)
            .variant("b", 1.0)
            .control("control")
            .build()
            .unwrap();
        MetricsAggregator::new(Arc::new(experiment))
    }

    #[test]
    fn test_new_table_is_zeroed() {
        let agg = aggregator();
        let snapshot = agg.snapshot();
        assert_eq!(snapshot.entries().len(), 2);
        for (_, metrics) in snapshot.entries() {
            assert_eq!(metrics.state(), MetricsState::Uninitialized);
        }
    }

    #[test]
    fn test_record_visit_and_convert() {
        let agg = aggregator();
        agg.record("b", EventType::Visit, None).unwrap();
        agg.record("b", "convert", Some(12.5)).unwrap();

        let metrics = agg.metrics("b").unwrap();
        assert_eq!(metrics.visitors(), 1);
        assert_eq!(metrics.conversions(), 1);
        assert!((metrics.revenue() - 12.5).abs() < f64::EPSILON);
        assert_eq!(agg.metrics("control").unwrap().state(), MetricsState::Uninitialized);
    }

    #[test]
    fn test_unknown_variant_leaves_counters_unchanged() {
        let agg = aggregator();
        agg.record("b", EventType::Visit, None).unwrap();
        let before = agg.snapshot();

        let err = agg
            .record("not-a-real-variant", EventType::Convert, Some(10.0))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownVariant { .. }));
        assert_eq!(before.entries(), agg.snapshot().entries());
    }

    #[test]
    fn test_invalid_value_rejected() {
        let agg = aggregator();
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = agg.record("b", EventType::Convert, Some(bad)).unwrap_err();
            assert!(matches!(err, Error::InvalidEvent(_)));
        }
        assert_eq!(agg.metrics("b").unwrap(), VariantMetrics::default());
    }

    #[test]
    fn test_reset() {
        let agg = aggregator();
        agg.record("control", EventType::Visit, None).unwrap();
        agg.reset();
        assert_eq!(agg.snapshot().total_visitors(), 0);
    }

    #[test]
    fn test_snapshot_lookup() {
        let agg = aggregator();
        agg.record("control", EventType::Visit, None).unwrap();
        agg.record("b", EventType::Visit, None).unwrap();
        agg.record("b", EventType::Visit, None).unwrap();

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.get("b").map(VariantMetrics::visitors), Some(2));
        assert!(snapshot.get("zzz").is_none());
        assert_eq!(snapshot.total_visitors(), 3);
    }
}
