//! Error types for trueno-ab
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trueno-ab error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment definition violates an invariant (raised at construction time)
    #[error("Invalid experiment configuration: {0}")]
    Configuration(String),

    /// Event recorded against a variant the experiment does not define
    #[error("Unknown variant '{variant_id}' for experiment '{experiment}'\nCheck that the caller holds the current experiment definition.")]
    UnknownVariant {
        /// Experiment the event was recorded against
        experiment: String,
        /// Offending variant id
        variant_id: String,
    },

    /// Event payload rejected (e.g. negative or non-finite value)
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Registry lookup for an experiment that was never registered
    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),

    /// Registry already holds an experiment with this name
    #[error("Experiment already registered: {0}")]
    DuplicateExperiment(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
