//! Experiment definition, builder and validated construction

use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Variant;
use crate::{Error, Result};

/// How a visitor hash is reduced to a point on the weight line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketSpace {
    /// Point falls in `[0, total_weight)`; weights are normalized and need
    /// not sum to any particular value.
    #[default]
    Normalized,
    /// Point is `hash % m`; weights are shares of a fixed modulus (e.g.
    /// percentages with `m = 100`). Uncovered points route to the control.
    Fixed(u64),
}

/// Raw, unvalidated experiment configuration as supplied by callers.
///
/// ```json
/// {
///   "name": "pricing-page",
///   "control_id": "control",
///   "variants": [
///     {"id": "control", "weight": 50},
///     {"id": "annual-first", "weight": 50, "config": {"default_plan": "annual"}}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentConfig {
    /// Experiment name
    pub name: String,
    /// Variants in assignment order
    pub variants: Vec<Variant>,
    /// ID of the control variant
    pub control_id: String,
    /// Hash reduction strategy
    #[serde(default)]
    pub bucket_space: BucketSpace,
    /// Creation timestamp (defaults to now when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A validated, immutable experiment.
///
/// Only constructible through [`Experiment::builder`],
/// [`Experiment::from_config`], [`Experiment::from_json`] or serde
/// deserialization, all of which run the same validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ExperimentConfig", into = "ExperimentConfig")]
pub struct Experiment {
    name: String,
    variants: Vec<Variant>,
    control_index: usize,
    bucket_space: BucketSpace,
    total_weight: f64,
    index: FxHashMap<String, usize>,
    created_at: DateTime<Utc>,
}

impl Experiment {
    /// Create a builder for an experiment with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(name)
    }

    /// Validate a raw configuration into an experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the experiment has no variants,
    /// duplicate or empty variant ids, a non-positive or non-finite weight,
    /// a control id that names no variant, an empty name, a zero fixed
    /// modulus, or a fixed modulus smaller than the summed weights.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_config(config: ExperimentConfig) -> Result<Self> {
        let ExperimentConfig {
            name,
            variants,
            control_id,
            bucket_space,
            created_at,
        } = config;

        if name.trim().is_empty() {
            return Err(Error::Configuration(
                "experiment name must not be empty".to_string(),
            ));
        }
        if variants.is_empty() {
            return Err(Error::Configuration(format!(
                "experiment '{name}' has no variants"
            )));
        }
        if bucket_space == BucketSpace::Fixed(0) {
            return Err(Error::Configuration(format!(
                "experiment '{name}' uses a fixed bucket space with modulus 0"
            )));
        }

        let mut seen = FxHashSet::default();
        for variant in &variants {
            if variant.id().is_empty() {
                return Err(Error::Configuration(format!(
                    "experiment '{name}' has a variant with an empty id"
                )));
            }
            if !variant.weight().is_finite() || variant.weight() <= 0.0 {
                return Err(Error::Configuration(format!(
                    "variant '{}' in experiment '{name}' has invalid weight {} (must be finite and > 0)",
                    variant.id(),
                    variant.weight()
                )));
            }
            if !seen.insert(variant.id()) {
                return Err(Error::Configuration(format!(
                    "duplicate variant id '{}' in experiment '{name}'",
                    variant.id()
                )));
            }
        }

        let total_weight: f64 = variants.iter().map(Variant::weight).sum();
        if let BucketSpace::Fixed(modulus) = bucket_space {
            if total_weight > modulus as f64 {
                return Err(Error::Configuration(format!(
                    "experiment '{name}' has total weight {total_weight} but fixed modulus {modulus}; \
                     variants past the modulus would never be assigned"
                )));
            }
            if total_weight < modulus as f64 {
                warn!(
                    experiment = %name,
                    total_weight,
                    modulus,
                    "fixed bucket space leaves uncovered points; they route to control"
                );
            }
        }

        let index: FxHashMap<String, usize> = variants
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id().to_string(), i))
            .collect();

        let control_index = *index.get(&control_id).ok_or_else(|| {
            Error::Configuration(format!(
                "control '{control_id}' is not a variant of experiment '{name}'"
            ))
        })?;

        Ok(Self {
            name,
            variants,
            control_index,
            bucket_space,
            total_weight,
            index,
            created_at: created_at.unwrap_or_else(Utc::now),
        })
    }

    /// Parse and validate an experiment from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::Configuration`] for a well-formed but invalid experiment.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ExperimentConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the variants in configured (assignment) order.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Get the number of variants.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Get the control variant.
    #[must_use]
    pub fn control(&self) -> &Variant {
        &self.variants[self.control_index]
    }

    /// Get the control variant ID.
    #[must_use]
    pub fn control_id(&self) -> &str {
        self.control().id()
    }

    /// Get the position of the control in [`Experiment::variants`].
    #[must_use]
    pub const fn control_index(&self) -> usize {
        self.control_index
    }

    /// Get the hash reduction strategy.
    #[must_use]
    pub const fn bucket_space(&self) -> BucketSpace {
        self.bucket_space
    }

    /// Get the sum of all variant weights.
    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.index_of(variant_id).map(|i| &self.variants[i])
    }

    /// Get the position of a variant by ID.
    #[must_use]
    pub fn index_of(&self, variant_id: &str) -> Option<usize> {
        self.index.get(variant_id).copied()
    }

    /// Check whether the experiment defines a variant with this ID.
    #[must_use]
    pub fn contains(&self, variant_id: &str) -> bool {
        self.index.contains_key(variant_id)
    }

    /// Assign a visitor to a variant. See [`crate::assignment::assign`].
    #[must_use]
    pub fn assign(&self, visitor_id: &str) -> &Variant {
        crate::assignment::assign(visitor_id, self)
    }
}

impl TryFrom<ExperimentConfig> for Experiment {
    type Error = Error;

    fn try_from(config: ExperimentConfig) -> Result<Self> {
        Self::from_config(config)
    }
}

impl From<Experiment> for ExperimentConfig {
    fn from(experiment: Experiment) -> Self {
        let control_id = experiment.control_id().to_string();
        Self {
            name: experiment.name,
            variants: experiment.variants,
            control_id,
            bucket_space: experiment.bucket_space,
            created_at: Some(experiment.created_at),
        }
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    name: String,
    variants: Vec<Variant>,
    control_id: Option<String>,
    bucket_space: BucketSpace,
    created_at: Option<DateTime<Utc>>,
}

impl ExperimentBuilder {
    /// Create a new builder with the experiment name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            control_id: None,
            bucket_space: BucketSpace::default(),
            created_at: None,
        }
    }

    /// Append a variant with no config payload.
    #[must_use]
    pub fn variant(self, id: impl Into<String>, weight: f64) -> Self {
        self.with_variant(Variant::new(id, weight))
    }

    /// Append a fully constructed variant.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Designate the control variant.
    #[must_use]
    pub fn control(mut self, control_id: impl Into<String>) -> Self {
        self.control_id = Some(control_id.into());
        self
    }

    /// Set the hash reduction strategy.
    #[must_use]
    pub const fn bucket_space(mut self, bucket_space: BucketSpace) -> Self {
        self.bucket_space = bucket_space;
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Validate and build the `Experiment`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no control was designated or the
    /// definition violates any experiment invariant.
    pub fn build(self) -> Result<Experiment> {
        let control_id = self.control_id.ok_or_else(|| {
            Error::Configuration(format!(
                "experiment '{}' has no designated control",
                self.name
            ))
        })?;

        Experiment::from_config(ExperimentConfig {
            name: self.name,
            variants: self.variants,
            control_id,
            bucket_space: self.bucket_space,
            created_at: self.created_at,
        })
    }
}
