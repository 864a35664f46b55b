//! Per-variant metric aggregation
//!
//! The [`MetricsAggregator`] owns one [`VariantMetrics`] counter set per
//! variant behind a single lock:
//!
//! - `record` applies every increment of one event as a unit
//! - `snapshot` copies all variants as of one logical instant
//! - `reset` zeroes the table (explicit lifecycle only; counters never
//!   decrease otherwise)
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use trueno_ab::experiment::Experiment;
//! use trueno_ab::metrics::{EventType, MetricsAggregator};
//!
//! let experiment = Arc::new(
//!     Experiment::builder("checkout")
//!         .variant("control", 1.0)
//!         .variant("one-click", 1.0)
//!         .control("control")
//!         .build()?,
//! );
//! let aggregator = MetricsAggregator::new(experiment);
//!
//! aggregator.record("one-click", EventType::Visit, None)?;
//! aggregator.record("one-click", EventType::Convert, Some(49.0))?;
//!
//! let snapshot = aggregator.snapshot();
//! let metrics = snapshot.get("one-click").unwrap();
//! assert_eq!(metrics.visitors(), 1);
//! assert_eq!(metrics.conversions(), 1);
//! # Ok::<(), trueno_ab::Error>(())
//! ```

mod aggregator;
mod event;
mod variant_metrics;

pub use aggregator::{MetricsAggregator, MetricsSnapshot};
pub use event::EventType;
pub use variant_metrics::{MetricsState, VariantMetrics};
