//! Two-proportion significance testing

/// Pooled two-proportion z-test of `treatment` vs `control` conversion rates.
///
/// Returns the confidence `(1 - p) * 100` of a two-sided test, in `[0, 100]`.
/// Degenerate inputs (an arm with no visitors, or zero pooled variance)
/// yield `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn two_proportion_confidence(
    control_visitors: u64,
    control_conversions: u64,
    treatment_visitors: u64,
    treatment_conversions: u64,
) -> f64 {
    if control_visitors == 0 || treatment_visitors == 0 {
        return 0.0;
    }

    let n1 = control_visitors as f64;
    let n2 = treatment_visitors as f64;
    let x1 = (control_conversions as f64).min(n1);
    let x2 = (treatment_conversions as f64).min(n2);

    let pooled = (x1 + x2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se <= 0.0 || !se.is_finite() {
        return 0.0;
    }

    let z = (x2 / n2 - x1 / n1) / se;
    let p_value = 2.0 * (1.0 - normal_cdf(z.abs()));
    ((1.0 - p_value) * 100.0).clamp(0.0, 100.0)
}

/// Standard normal CDF.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26 (max error 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}
