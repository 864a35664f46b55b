//! Concurrent registry of running experiments, keyed by experiment name.
//!
//! Hosts running several experiments at once hold one registry instead of
//! threading individual engines through their code.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use crate::engine::ExperimentEngine;
use crate::metrics::EventType;
use crate::report::ExperimentReport;
use crate::{Error, Result};

/// Thread-safe map of experiment name → engine.
///
/// Uses `DashMap` internally so lookups on different experiments never
/// contend. Each engine keeps its own metrics lock.
///
/// # Example
///
/// ```rust
/// use trueno_ab::engine::ExperimentEngine;
/// use trueno_ab::experiment::Experiment;
/// use trueno_ab::registry::ExperimentRegistry;
///
/// let registry = ExperimentRegistry::new();
/// let experiment = Experiment::builder("headline")
///     .variant("control", 1.0)
///     .variant("question", 1.0)
///     .control("control")
///     .build()?;
/// registry.register(ExperimentEngine::new(experiment))?;
///
/// let variant = registry.assign("headline", "visitor-1")?;
/// registry.record("headline", &variant, "visit", None)?;
/// assert_eq!(registry.report("headline")?.results().len(), 2);
/// # Ok::<(), trueno_ab::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ExperimentRegistry {
    engines: DashMap<String, Arc<ExperimentEngine>>,
}

impl ExperimentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engines: DashMap::new(),
        }
    }

    /// Get the number of registered experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Register an engine under its experiment's name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateExperiment`] if the name is already taken;
    /// the existing engine is left in place.
    pub fn register(&self, engine: ExperimentEngine) -> Result<Arc<ExperimentEngine>> {
        let name = engine.experiment().name().to_string();
        match self.engines.entry(name) {
            Entry::Occupied(entry) => Err(Error::DuplicateExperiment(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!(experiment = entry.key().as_str(), "experiment registered");
                let engine = Arc::new(engine);
                entry.insert(Arc::clone(&engine));
                Ok(engine)
            }
        }
    }

    /// Get a registered engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExperiment`] if no engine has this name.
    pub fn get(&self, name: &str) -> Result<Arc<ExperimentEngine>> {
        self.engines
            .get(name)
            .map(|engine| Arc::clone(engine.value()))
            .ok_or_else(|| Error::UnknownExperiment(name.to_string()))
    }

    /// Remove an engine, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExperiment`] if no engine has this name.
    pub fn remove(&self, name: &str) -> Result<Arc<ExperimentEngine>> {
        let (_, engine) = self
            .engines
            .remove(name)
            .ok_or_else(|| Error::UnknownExperiment(name.to_string()))?;
        info!(experiment = name, "experiment removed");
        Ok(engine)
    }

    /// Get the registered experiment names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Assign a visitor within a named experiment, returning the variant id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExperiment`] if no engine has this name.
    pub fn assign(&self, name: &str, visitor_id: &str) -> Result<String> {
        let engine = self.get(name)?;
        let variant_id = engine.assign(visitor_id).id().to_string();
        Ok(variant_id)
    }

    /// Record an event within a named experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExperiment`] for an unregistered name, otherwise
    /// see [`ExperimentEngine::record`].
    pub fn record(
        &self,
        name: &str,
        variant_id: &str,
        event: impl Into<EventType>,
        value: Option<f64>,
    ) -> Result<()> {
        self.get(name)?.record(variant_id, event, value)
    }

    /// Report on a named experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExperiment`] if no engine has this name.
    pub fn report(&self, name: &str) -> Result<ExperimentReport> {
        Ok(self.get(name)?.report())
    }
}
