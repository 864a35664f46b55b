//! # Trueno-AB: Experiment Assignment & Analysis Engine
//!
//! **Version**: 0.1.0
//!
//! Trueno-AB decides which variant of a product experience a visitor sees
//! and continuously computes whether any variant is outperforming the
//! control.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Muda elimination**: Assignment is a pure hash walk, nothing is stored
//! - **Poka-Yoke safety**: Experiments are validated once at construction;
//!   assignment can never fail a visitor-facing path (control fallback)
//! - **Genchi Genbutsu**: Counters come only from recorded events, never
//!   simulated
//! - **Jidoka**: Unknown variants and invalid amounts stop the call instead
//!   of silently corrupting metrics
//!
//! ## Components
//!
//! ```text
//! assignment  (stateless)  visitor_id ─► variant
//! metrics     (one lock)   record / snapshot / reset
//! analysis    (pure)       snapshot ─► improvement, confidence, winner
//! report                   ranking + JSON for reporting consumers
//! engine                   one experiment, owned explicitly by the caller
//! registry                 many engines keyed by experiment name
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use trueno_ab::engine::ExperimentEngine;
//! use trueno_ab::experiment::Experiment;
//! use trueno_ab::report::SortOrder;
//!
//! let experiment = Experiment::builder("checkout-flow")
//!     .variant("control", 50.0)
//!     .variant("one-page", 25.0)
//!     .variant("express", 25.0)
//!     .control("control")
//!     .build()?;
//! let engine = ExperimentEngine::new(experiment);
//!
//! for i in 0..100 {
//!     engine.record_visit(&format!("visitor-{i}"))?;
//! }
//! engine.record_conversion("visitor-3", Some(42.0))?;
//!
//! let report = engine.report();
//! for result in report.ranked(SortOrder::Descending) {
//!     println!("{}: {:+.1}%", result.variant_id(), result.improvement_pct());
//! }
//! # Ok::<(), trueno_ab::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod assignment;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod registry;
pub mod report;

pub use engine::ExperimentEngine;
pub use error::{Error, Result};
pub use experiment::{Experiment, Variant};
