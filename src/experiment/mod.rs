//! Experiment definitions
//!
//! An [`Experiment`] is a named, ordered list of weighted [`Variant`]s with one
//! designated control. Experiments are validated once at construction and are
//! immutable afterwards, so every downstream component (assignment, metrics,
//! analysis) can rely on the invariants below without re-checking them.
//!
//! ## Invariants
//!
//! ```text
//! Experiment
//!   ├── name            non-empty
//!   ├── variants (N ≥ 1) ids unique + non-empty, weights finite and > 0
//!   ├── control_id      one of the variant ids
//!   └── bucket_space    Normalized | Fixed(m > 0)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_ab::experiment::Experiment;
//!
//! let experiment = Experiment::builder("checkout-button")
//!     .variant("control", 50.0)
//!     .variant("green", 25.0)
//!     .variant("large", 25.0)
//!     .control("control")
//!     .build()?;
//!
//! assert_eq!(experiment.variant_count(), 3);
//! assert_eq!(experiment.control().id(), "control");
//! # Ok::<(), trueno_ab::Error>(())
//! ```

mod definition;
mod variant;

pub use definition::{BucketSpace, Experiment, ExperimentBuilder, ExperimentConfig};
pub use variant::Variant;
