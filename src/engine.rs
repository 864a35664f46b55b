//! Experiment engine - one experiment, its counters and its analysis config
//!
//! The engine is an explicit owned object: callers construct it, share it
//! (typically behind an `Arc`) and drop it. There is no process-wide state.
//!
//! ```text
//! visitor ──assign──► variant id ──record(visit)──┐
//!                                                  ├─► MetricsAggregator ──report──► ExperimentReport
//! conversion ──record(convert, value)─────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use crate::analysis::{self, AnalysisConfig, ExperimentResult};
use crate::experiment::{Experiment, Variant};
use crate::metrics::{EventType, MetricsAggregator, MetricsSnapshot, VariantMetrics};
use crate::report::ExperimentReport;
use crate::Result;

/// Assignment, aggregation and reporting for a single experiment.
///
/// `Send + Sync`: assignment is lock-free, recording and reporting share one
/// short-lived lock inside the aggregator.
///
/// # Example
///
/// ```rust
/// use trueno_ab::engine::ExperimentEngine;
/// use trueno_ab::experiment::Experiment;
///
/// let experiment = Experiment::builder("pricing")
///     .variant("control", 50.0)
///     .variant("annual-first", 50.0)
///     .control("control")
///     .build()?;
/// let engine = ExperimentEngine::new(experiment);
///
/// let variant = engine.record_visit("visitor-7")?.id().to_string();
/// engine.record_conversion("visitor-7", Some(99.0))?;
///
/// let report = engine.report();
/// assert_eq!(report.results().len(), 2);
/// assert_eq!(report.result(&variant).unwrap().metrics().conversions(), 1);
/// # Ok::<(), trueno_ab::Error>(())
/// ```
#[derive(Debug)]
pub struct ExperimentEngine {
    experiment: Arc<Experiment>,
    aggregator: MetricsAggregator,
    analysis: AnalysisConfig,
}

impl ExperimentEngine {
    /// Create an engine with the default analysis config.
    #[must_use]
    pub fn new(experiment: Experiment) -> Self {
        Self::with_analysis(experiment, AnalysisConfig::default())
    }

    /// Create an engine with a custom analysis config.
    #[must_use]
    pub fn with_analysis(experiment: Experiment, analysis: AnalysisConfig) -> Self {
        let experiment = Arc::new(experiment);
        info!(
            experiment = experiment.name(),
            variants = experiment.variant_count(),
            control = experiment.control_id(),
            model = ?analysis.confidence_model(),
            "experiment engine created"
        );
        Self {
            aggregator: MetricsAggregator::new(Arc::clone(&experiment)),
            experiment,
            analysis,
        }
    }

    /// Get the experiment definition.
    #[must_use]
    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    /// Get the analysis config.
    #[must_use]
    pub const fn analysis_config(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Assign a visitor to a variant. Pure; records nothing.
    #[must_use]
    pub fn assign(&self, visitor_id: &str) -> &Variant {
        self.experiment.assign(visitor_id)
    }

    /// Record an event against a variant.
    ///
    /// # Errors
    ///
    /// See [`MetricsAggregator::record`].
    pub fn record(
        &self,
        variant_id: &str,
        event: impl Into<EventType>,
        value: Option<f64>,
    ) -> Result<()> {
        self.aggregator.record(variant_id, event, value)
    }

    /// Assign a visitor and record a `visit` against the assigned variant.
    ///
    /// # Errors
    ///
    /// See [`MetricsAggregator::record`].
    pub fn record_visit(&self, visitor_id: &str) -> Result<&Variant> {
        let variant = self.assign(visitor_id);
        self.aggregator.record(variant.id(), EventType::Visit, None)?;
        Ok(variant)
    }

    /// Record a `convert` (with optional amount) against the visitor's variant.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidEvent`] for a negative or non-finite value.
    pub fn record_conversion(&self, visitor_id: &str, value: Option<f64>) -> Result<&Variant> {
        let variant = self.assign(visitor_id);
        self.aggregator.record(variant.id(), EventType::Convert, value)?;
        Ok(variant)
    }

    /// Get a copy of one variant's counters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownVariant`] for an id outside the experiment.
    pub fn metrics(&self, variant_id: &str) -> Result<VariantMetrics> {
        self.aggregator.metrics(variant_id)
    }

    /// Copy all counters as of one instant.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.aggregator.snapshot()
    }

    /// Analyze a consistent snapshot of the counters.
    ///
    /// Read-only: repeated calls with no intervening `record` return identical
    /// results.
    #[must_use]
    pub fn report(&self) -> ExperimentReport {
        let snapshot = self.aggregator.snapshot();
        let results = analysis::analyze(&self.experiment, &snapshot, &self.analysis);
        ExperimentReport::new(
            self.experiment.name(),
            self.experiment.control_id(),
            snapshot.taken_at(),
            results,
        )
    }

    /// Per-variant results in experiment order (no ranking, no timestamp).
    #[must_use]
    pub fn results(&self) -> Vec<ExperimentResult> {
        self.report().into_results()
    }

    /// Zero every counter; the experiment definition is unchanged.
    pub fn reset(&self) {
        self.aggregator.reset();
    }
}
