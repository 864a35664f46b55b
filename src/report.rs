//! Reporting layer on top of the raw analysis
//!
//! The engine's `report` returns results in experiment order; ranking for
//! display is layered here so consumers choose the order they render.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::ExperimentResult;
use crate::Result;

/// Sort order for ranking results by improvement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (worst improvement first)
    Ascending,
    /// Descending order (best improvement first)
    #[default]
    Descending,
}

/// A timestamped set of per-variant results for one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    experiment: String,
    control_id: String,
    generated_at: DateTime<Utc>,
    results: Vec<ExperimentResult>,
}

impl ExperimentReport {
    /// Assemble a report from analysis results.
    #[must_use]
    pub fn new(
        experiment: impl Into<String>,
        control_id: impl Into<String>,
        generated_at: DateTime<Utc>,
        results: Vec<ExperimentResult>,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            control_id: control_id.into(),
            generated_at,
            results,
        }
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the control variant ID.
    #[must_use]
    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    /// Get the instant the underlying metrics snapshot was taken.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Get the results in experiment order.
    #[must_use]
    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    /// Consume the report, returning the results in experiment order.
    #[must_use]
    pub fn into_results(self) -> Vec<ExperimentResult> {
        self.results
    }

    /// Look up one variant's result.
    #[must_use]
    pub fn result(&self, variant_id: &str) -> Option<&ExperimentResult> {
        self.results.iter().find(|r| r.variant_id() == variant_id)
    }

    /// Get the control's result.
    #[must_use]
    pub fn control(&self) -> Option<&ExperimentResult> {
        self.results.iter().find(|r| r.is_control())
    }

    /// Results ranked by `improvement_pct`.
    ///
    /// The sort is stable: ties keep experiment order.
    #[must_use]
    pub fn ranked(&self, order: SortOrder) -> Vec<&ExperimentResult> {
        let mut ranked: Vec<&ExperimentResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| compare(a, b, order));
        ranked
    }

    /// The best-ranked winning variant, if any.
    #[must_use]
    pub fn winner(&self) -> Option<&ExperimentResult> {
        self.ranked(SortOrder::Descending)
            .into_iter()
            .find(|r| r.is_winner())
    }

    /// Render the report as pretty-printed JSON for a reporting consumer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn compare(a: &ExperimentResult, b: &ExperimentResult, order: SortOrder) -> Ordering {
    let ord = a.improvement_pct().total_cmp(&b.improvement_pct());
    match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}
