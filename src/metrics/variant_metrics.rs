//! Counters and derived ratios for one variant

use serde::{Deserialize, Serialize};

use super::EventType;

/// Lifecycle of a variant's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsState {
    /// No event recorded yet (counters all zero).
    Uninitialized,
    /// At least one event recorded.
    Active,
}

/// Running counters for a single variant.
///
/// Derived ratios never produce `NaN` or infinity: a zero denominator yields
/// `0.0` so reports are always renderable, even for a variant with no traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    visitors: u64,
    conversions: u64,
    revenue: f64,
    custom_events: u64,
    events: u64,
}

impl VariantMetrics {
    /// Apply one already-validated event.
    pub(crate) fn apply(&mut self, event: &EventType, amount: f64) {
        match event {
            EventType::Visit => self.visitors += 1,
            EventType::Convert => {
                self.conversions += 1;
                self.revenue += amount;
            }
            EventType::Custom(_) => {
                self.custom_events += 1;
                self.revenue += amount;
            }
        }
        self.events += 1;
    }

    /// Get the number of visit events.
    #[must_use]
    pub const fn visitors(&self) -> u64 {
        self.visitors
    }

    /// Get the number of conversion events.
    #[must_use]
    pub const fn conversions(&self) -> u64 {
        self.conversions
    }

    /// Get the running revenue sum.
    #[must_use]
    pub const fn revenue(&self) -> f64 {
        self.revenue
    }

    /// Get the number of custom (non visit/convert) events.
    #[must_use]
    pub const fn custom_events(&self) -> u64 {
        self.custom_events
    }

    /// Get the total number of events of any type.
    #[must_use]
    pub const fn events(&self) -> u64 {
        self.events
    }

    /// Get the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MetricsState {
        if self.events == 0 {
            MetricsState::Uninitialized
        } else {
            MetricsState::Active
        }
    }

    /// `conversions / visitors`, or `0.0` with no visitors.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn conversion_rate(&self) -> f64 {
        self.conversions as f64 / self.visitors.max(1) as f64
    }

    /// `revenue / conversions`, or `0.0` with no conversions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_order_value(&self) -> f64 {
        if self.conversions == 0 {
            0.0
        } else {
            self.revenue / self.conversions as f64
        }
    }

    /// `revenue / visitors`, or `0.0` with no visitors.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn revenue_per_visitor(&self) -> f64 {
        if self.visitors == 0 {
            0.0
        } else {
            self.revenue / self.visitors as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uninitialized() {
        let metrics = VariantMetrics::default();
        assert_eq!(metrics.state(), MetricsState::Uninitialized);
        assert!(metrics.conversion_rate().abs() < f64::EPSILON);
        assert!(metrics.avg_order_value().abs() < f64::EPSILON);
        assert!(metrics.revenue_per_visitor().abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_events() {
        let mut metrics = VariantMetrics::default();
        metrics.apply(&EventType::Visit, 0.0);
        metrics.apply(&EventType::Visit, 0.0);
        metrics.apply(&EventType::Convert, 30.0);
        metrics.apply(&EventType::Custom("tip".into()), 5.0);

        assert_eq!(metrics.state(), MetricsState::Active);
        assert_eq!(metrics.visitors(), 2);
        assert_eq!(metrics.conversions(), 1);
        assert_eq!(metrics.custom_events(), 1);
        assert_eq!(metrics.events(), 4);
        assert!((metrics.revenue() - 35.0).abs() < f64::EPSILON);
        assert!((metrics.conversion_rate() - 0.5).abs() < f64::EPSILON);
        assert!((metrics.avg_order_value() - 35.0).abs() < f64::EPSILON);
        assert!((metrics.revenue_per_visitor() - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_conversions_without_visits_stay_finite() {
        let mut metrics = VariantMetrics::default();
        for _ in 0..3 {
            metrics.apply(&EventType::Convert, 4.0);
        }
        assert!(metrics.conversion_rate().is_finite());
        assert!((metrics.avg_order_value() - 4.0).abs() < f64::EPSILON);
        assert!(metrics.revenue_per_visitor().abs() < f64::EPSILON);
    }
}
