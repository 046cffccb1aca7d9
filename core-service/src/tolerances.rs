//! Numeric tolerances used by the attribution checks and tests.
//!
//! | Category | Basis | Value |
//! |----------|-------|-------|
//! | Exact | IEEE 754 f64 | 0.0 for unused features |
//! | Analytical | f64 rounding in short sums | 1e-12 |
//! | Additivity | TreeSHAP path weights over many trees | 1e-6 relative |

/// Results that must be bit-exact (unused feature contributions, determinism).
pub const EXACT: f64 = 0.0;

/// Short analytical sums (a stump's contribution, a handful of leaves).
pub const ANALYTICAL_F64: f64 = 1e-12;

/// `baseline + sum(contributions)` vs. the prediction.
///
/// Path weights are products and quotients of cover fractions; for
/// ensembles of a few hundred depth-6 trees the accumulated rounding stays
/// several orders of magnitude below this.
pub const ADDITIVITY_RELATIVE: f64 = 1e-6;

/// Declared `expected_value` in an artifact vs. the baseline recomputed from
/// node covers. Exporters round covers, so this is looser than additivity.
pub const DECLARED_BASELINE_RELATIVE: f64 = 1e-4;

/// `|a - b| <= tol * max(1, |a|, |b|)`.
///
/// The floor of 1 keeps the check meaningful when both sides are near zero.
pub fn within_relative(a: f64, b: f64, tol: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tol * scale
}
