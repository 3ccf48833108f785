/// 1-based index of the bucket containing `x` when `[a, b)` is split into `n`
/// buckets of equal width.
///
/// Values below `a` land in bucket 1; values at or above `b` land in bucket
/// `n + 1` or later, one bucket per further width. Used to histogram scores
/// or timings.
///
/// Returns `None` for `n == 0`, an empty or inverted range, or non-finite
/// input.
///
/// # Example
///
/// ```rust
/// use proctor_adapters::slot;
///
/// assert_eq!(slot(0.0, 100.0, 0.0, 10), Some(1));
/// assert_eq!(slot(0.0, 100.0, 45.0, 10), Some(5));
/// assert_eq!(slot(0.0, 100.0, 99.9, 10), Some(10));
/// ```
#[must_use]
pub fn slot(a: f64, b: f64, x: f64, n: u32) -> Option<usize> {
    if n == 0 || !(a.is_finite() && b.is_finite() && x.is_finite()) || b <= a {
        return None;
    }

    let width = (b - a) / f64::from(n);
    let steps = ((x - a) / width).floor();
    if steps <= 0.0 {
        return Some(1);
    }
    Some((steps as usize).saturating_add(1))
}
