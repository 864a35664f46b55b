//! Variant - one candidate experience within an experiment

use serde::{Deserialize, Serialize};

/// A weighted candidate experience.
///
/// The `config` payload (pricing, copy, colors, ...) is opaque to the engine:
/// it is carried through assignment untouched and never inspected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    id: String,
    weight: f64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    config: serde_json::Value,
}

impl Variant {
    /// Create a variant with an empty (`null`) config payload.
    ///
    /// The weight is a relative traffic share; it is validated when the
    /// owning experiment is built.
    #[must_use]
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            config: serde_json::Value::Null,
        }
    }

    /// Attach an opaque config payload.
    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    /// Get the variant ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the relative traffic weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Get the opaque config payload (`Value::Null` when none was set).
    #[must_use]
    pub const fn config(&self) -> &serde_json::Value {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_new() {
        let variant = Variant::new("control", 50.0);
        assert_eq!(variant.id(), "control");
        assert!((variant.weight() - 50.0).abs() < f64::EPSILON);
        assert!(variant.config().is_null());
    }

    #[test]
    fn test_variant_config_passthrough() {
        let config = serde_json::json!({"price": 19.99, "cta": "Buy now"});
        let variant = Variant::new("discount", 25.0).with_config(config.clone());
        assert_eq!(variant.config(), &config);
    }

    #[test]
    fn test_variant_integer_weight_from_json() {
        let variant: Variant = serde_json::from_str(r#"{"id": "a", "weight": 30}"#).unwrap();
        assert!((variant.weight() - 30.0).abs() < f64::EPSILON);
        assert!(variant.config().is_null());
    }
}
