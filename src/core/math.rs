//! Small numeric helpers.

/// Linear interpolation: `a + (b - a) * k`.
///
/// `k` is not clamped; values outside `[0, 1]` extrapolate.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, k: f64) -> f64 {
    (b - a) * k + a
}

/// Clamp `value` into `[min, max]`.
#[inline]
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
