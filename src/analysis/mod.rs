//! Lift, confidence and winner analysis
//!
//! Turns a [`MetricsSnapshot`] into one [`ExperimentResult`] per variant:
//!
//! ```text
//! conversion_rate = conversions / max(visitors, 1)
//! improvement_pct = (rate - control_rate) / control_rate * 100   (0 for control,
//!                                                                  0 if control_rate == 0)
//! confidence      = model-dependent score in [0, 100]             (100 for control)
//! is_winner       = !control && improvement_pct > lift_threshold
//!                            && confidence      > confidence_threshold
//! ```
//!
//! ## Confidence models
//!
//! - [`ConfidenceModel::Heuristic`] (default): `min(cap, |improvement| * 10 + 60)`.
//!   It has no sample-size awareness: 1 conversion out of 5 visitors can score
//!   as high as 100 out of 5,000. Treat it as a dashboard signal, not a test.
//! - [`ConfidenceModel::TwoProportionZ`]: pooled two-proportion z-test. Under
//!   this model at most one variant is flagged as winner (the qualifying
//!   variant with the greatest improvement).
//!
//! A control with a zero conversion rate makes every improvement `0`; this is
//! a known limitation of relative lift, surfaced as `0` rather than `NaN`.

mod significance;

pub use significance::{normal_cdf, two_proportion_confidence};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::experiment::Experiment;
use crate::metrics::{MetricsSnapshot, VariantMetrics};

/// Default minimum improvement (percent) for a winner.
pub const DEFAULT_LIFT_THRESHOLD_PCT: f64 = 20.0;

/// Default minimum confidence for a winner.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 85.0;

/// Default ceiling of the heuristic confidence score.
pub const DEFAULT_HEURISTIC_CONFIDENCE_CAP: f64 = 95.0;

/// How confidence is scored for non-control variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceModel {
    /// Lift-only heuristic, no sample-size weighting.
    #[default]
    Heuristic,
    /// Pooled two-proportion z-test.
    TwoProportionZ,
}

/// Analysis thresholds and model selection.
///
/// Deserialization validates: thresholds must be finite, the confidence
/// threshold and heuristic cap must lie in `[0, 100]`, and the lift threshold
/// must be non-negative. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnalysisConfig")]
pub struct AnalysisConfig {
    confidence_model: ConfidenceModel,
    lift_threshold_pct: f64,
    confidence_threshold: f64,
    heuristic_confidence_cap: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_model: ConfidenceModel::default(),
            lift_threshold_pct: DEFAULT_LIFT_THRESHOLD_PCT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            heuristic_confidence_cap: DEFAULT_HEURISTIC_CONFIDENCE_CAP,
        }
    }
}

/// Unvalidated wire form of [`AnalysisConfig`].
#[derive(Deserialize)]
#[serde(default)]
struct RawAnalysisConfig {
    confidence_model: ConfidenceModel,
    lift_threshold_pct: f64,
    confidence_threshold: f64,
    heuristic_confidence_cap: f64,
}

impl Default for RawAnalysisConfig {
    fn default() -> Self {
        let defaults = AnalysisConfig::default();
        Self {
            confidence_model: defaults.confidence_model,
            lift_threshold_pct: defaults.lift_threshold_pct,
            confidence_threshold: defaults.confidence_threshold,
            heuristic_confidence_cap: defaults.heuristic_confidence_cap,
        }
    }
}

impl TryFrom<RawAnalysisConfig> for AnalysisConfig {
    type Error = Error;

    fn try_from(raw: RawAnalysisConfig) -> Result<Self> {
        if !raw.lift_threshold_pct.is_finite() || raw.lift_threshold_pct < 0.0 {
            return Err(Error::Configuration(format!(
                "lift_threshold_pct must be finite and >= 0, got {}",
                raw.lift_threshold_pct
            )));
        }
        for (field, value) in [
            ("confidence_threshold", raw.confidence_threshold),
            ("heuristic_confidence_cap", raw.heuristic_confidence_cap),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::Configuration(format!(
                    "{field} must lie in [0, 100], got {value}"
                )));
            }
        }

        Ok(Self {
            confidence_model: raw.confidence_model,
            lift_threshold_pct: raw.lift_threshold_pct,
            confidence_threshold: raw.confidence_threshold,
            heuristic_confidence_cap: raw.heuristic_confidence_cap,
        })
    }
}

impl AnalysisConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Get the confidence model.
    #[must_use]
    pub const fn confidence_model(&self) -> ConfidenceModel {
        self.confidence_model
    }

    /// Get the minimum improvement (percent) a winner must exceed.
    #[must_use]
    pub const fn lift_threshold_pct(&self) -> f64 {
        self.lift_threshold_pct
    }

    /// Get the minimum confidence a winner must exceed.
    #[must_use]
    pub const fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Get the ceiling of the heuristic confidence score.
    #[must_use]
    pub const fn heuristic_confidence_cap(&self) -> f64 {
        self.heuristic_confidence_cap
    }
}

/// Builder for `AnalysisConfig`.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Set the confidence model.
    #[must_use]
    pub const fn confidence_model(mut self, model: ConfidenceModel) -> Self {
        self.config.confidence_model = model;
        self
    }

    /// Set the minimum improvement (percent) for a winner.
    #[must_use]
    pub const fn lift_threshold_pct(mut self, pct: f64) -> Self {
        self.config.lift_threshold_pct = pct;
        self
    }

    /// Set the minimum confidence for a winner.
    #[must_use]
    pub const fn confidence_threshold(mut self, confidence: f64) -> Self {
        self.config.confidence_threshold = confidence;
        self
    }

    /// Set the heuristic confidence ceiling (clamped to `[0, 100]`).
    #[must_use]
    pub fn heuristic_confidence_cap(mut self, cap: f64) -> Self {
        self.config.heuristic_confidence_cap = cap.clamp(0.0, 100.0);
        self
    }

    /// Build the `AnalysisConfig`.
    #[must_use]
    pub const fn build(self) -> AnalysisConfig {
        self.config
    }
}

/// Analysis outcome for one variant. Recomputed on every report, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    variant_id: String,
    is_control: bool,
    metrics: VariantMetrics,
    conversion_rate: f64,
    improvement_pct: f64,
    confidence: f64,
    is_winner: bool,
}

impl ExperimentResult {
    /// Get the variant ID.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Whether this variant is the control.
    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.is_control
    }

    /// Get the counters the result was computed from.
    #[must_use]
    pub const fn metrics(&self) -> &VariantMetrics {
        &self.metrics
    }

    /// Get `conversions / max(visitors, 1)`.
    #[must_use]
    pub const fn conversion_rate(&self) -> f64 {
        self.conversion_rate
    }

    /// Get the relative improvement over control, in percent.
    #[must_use]
    pub const fn improvement_pct(&self) -> f64 {
        self.improvement_pct
    }

    /// Get the confidence score in `[0, 100]`.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Whether the variant beats control by the configured thresholds.
    #[must_use]
    pub const fn is_winner(&self) -> bool {
        self.is_winner
    }
}

/// Compute one result per configured variant, in experiment order.
///
/// Variants with no recorded events are included with zeroed metrics.
#[must_use]
pub fn analyze(
    experiment: &Experiment,
    snapshot: &MetricsSnapshot,
    config: &AnalysisConfig,
) -> Vec<ExperimentResult> {
    let metrics_of = |id: &str| snapshot.get(id).copied().unwrap_or_default();

    let control = metrics_of(experiment.control_id());
    let control_rate = control.conversion_rate();

    let mut results: Vec<ExperimentResult> = experiment
        .variants()
        .iter()
        .map(|variant| {
            let metrics = metrics_of(variant.id());
            let is_control = variant.id() == experiment.control_id();
            let conversion_rate = metrics.conversion_rate();

            let (improvement_pct, confidence) = if is_control {
                (0.0, 100.0)
            } else {
                let improvement = relative_improvement(conversion_rate, control_rate);
                let confidence = match config.confidence_model {
                    ConfidenceModel::Heuristic => {
                        heuristic_confidence(improvement, config.heuristic_confidence_cap)
                    }
                    ConfidenceModel::TwoProportionZ => two_proportion_confidence(
                        control.visitors(),
                        control.conversions(),
                        metrics.visitors(),
                        metrics.conversions(),
                    ),
                };
                (improvement, confidence)
            };

            let is_winner = !is_control
                && improvement_pct > config.lift_threshold_pct
                && confidence > config.confidence_threshold;

            ExperimentResult {
                variant_id: variant.id().to_string(),
                is_control,
                metrics,
                conversion_rate,
                improvement_pct,
                confidence,
                is_winner,
            }
        })
        .collect();

    if config.confidence_model == ConfidenceModel::TwoProportionZ {
        keep_single_winner(&mut results);
    }

    results
}

/// Relative lift in percent; `0.0` when the baseline rate is zero.
#[must_use]
pub fn relative_improvement(rate: f64, baseline_rate: f64) -> f64 {
    if baseline_rate == 0.0 {
        0.0
    } else {
        (rate - baseline_rate) / baseline_rate * 100.0
    }
}

/// `min(cap, |improvement| * 10 + 60)`, always within `[0, 100]`.
///
/// `cap` is clamped to `[0, 100]`; a NaN cap counts as `100`.
#[must_use]
pub fn heuristic_confidence(improvement_pct: f64, cap: f64) -> f64 {
    let cap = if cap.is_nan() { 100.0 } else { cap.clamp(0.0, 100.0) };
    improvement_pct.abs().mul_add(10.0, 60.0).clamp(0.0, cap)
}

/// Clear every winner flag except the one with the greatest improvement
/// (first in experiment order on ties).
fn keep_single_winner(results: &mut [ExperimentResult]) {
    let best = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_winner)
        .fold(None::<(usize, f64)>, |best, (i, r)| match best {
            Some((_, pct)) if pct >= r.improvement_pct => best,
            _ => Some((i, r.improvement_pct)),
        })
        .map(|(i, _)| i);

    for (i, result) in results.iter_mut().enumerate() {
        result.is_winner = result.is_winner && Some(i) == best;
    }
}
