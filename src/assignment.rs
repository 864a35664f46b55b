//! Deterministic visitor → variant assignment
//!
//! **Problem**: a visitor must see the same variant on every visit, across
//! processes and restarts, without the engine storing anything.
//!
//! **Solution**: hash the visitor id, reduce the hash to a point on the
//! cumulative weight line, and walk the variants in configured order.
//!
//! ```text
//! visitor_id ──hash_key──► u64 ──avalanche──► u64 ──reduce──► point
//!
//!   weights [50, 25, 25]      point = 61.3
//!   ├──────── control ────────┼──── b ────┼──── c ────┤
//!   0                        50    ▲     75          100
//!                                  └ b wins
//! ```
//!
//! Assignment is a pure function: no I/O, no randomness, no hidden state.
//! It is safe to call from any number of threads without synchronization.

use tracing::{debug, warn};

use crate::experiment::{BucketSpace, Experiment, Variant};

/// Number of discrete buckets used by [`BucketSpace::Normalized`].
///
/// The hash is reduced modulo this value and then scaled onto
/// `[0, total_weight)`, giving 0.01% traffic granularity.
pub const NORMALIZED_RESOLUTION: u64 = 10_000;

/// Stable 64-bit hash of a visitor id.
///
/// Uses trueno's `hash_key` (scalar FxHash over the id bytes) followed by a
/// SplitMix64 finalizer so that the low-order bits used by the modulo
/// reduction are uniformly mixed. Both stages are fixed algorithms, so the
/// result is identical across processes, platforms and restarts.
#[must_use]
pub fn visitor_hash(visitor_id: &str) -> u64 {
    avalanche(trueno::hash_key(visitor_id))
}

/// SplitMix64 finalizer.
const fn avalanche(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Reduce a visitor hash to a point on the experiment's weight line.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bucket_point(hash: u64, experiment: &Experiment) -> f64 {
    match experiment.bucket_space() {
        BucketSpace::Normalized => {
            let bucket = (hash % NORMALIZED_RESOLUTION) as f64;
            bucket / NORMALIZED_RESOLUTION as f64 * experiment.total_weight()
        }
        BucketSpace::Fixed(modulus) => (hash % modulus) as f64,
    }
}

/// Walk the variants in configured order and return the first whose
/// cumulative weight exceeds `point`.
///
/// Points the walk cannot place (beyond the total weight, negative, or NaN)
/// fall back to the control. This never fails.
#[must_use]
pub fn variant_at(experiment: &Experiment, point: f64) -> &Variant {
    if point >= 0.0 {
        let mut cumulative = 0.0;
        for variant in experiment.variants() {
            cumulative += variant.weight();
            if point < cumulative {
                return variant;
            }
        }
    }

    debug!(
        experiment = experiment.name(),
        point,
        total_weight = experiment.total_weight(),
        control = experiment.control_id(),
        "no bucket covers point, falling back to control"
    );
    experiment.control()
}

/// Assign a visitor to one variant of `experiment`.
///
/// Calling this twice with identical inputs always returns the identical
/// variant. The caller owns visitor identity: it must supply an id that is
/// stable across sessions. An empty id is still answered deterministically
/// but logged as a caller bug.
///
/// # Example
///
/// ```rust
/// use trueno_ab::assignment::assign;
/// use trueno_ab::experiment::Experiment;
///
/// let experiment = Experiment::builder("hero-copy")
///     .variant("control", 1.0)
///     .variant("bold", 1.0)
///     .control("control")
///     .build()?;
///
/// let first = assign("visitor-42", &experiment).id();
/// let again = assign("visitor-42", &experiment).id();
/// assert_eq!(first, again);
/// # Ok::<(), trueno_ab::Error>(())
/// ```
#[must_use]
pub fn assign<'a>(visitor_id: &str, experiment: &'a Experiment) -> &'a Variant {
    if visitor_id.is_empty() {
        warn!(
            experiment = experiment.name(),
            "assigning an empty visitor id; callers must supply a stable identifier"
        );
    }

    let point = bucket_point(visitor_hash(visitor_id), experiment);
    variant_at(experiment, point)
}
