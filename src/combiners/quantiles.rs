//! Exact quantiles over a fully buffered column.
//!
//! Values are collected, sorted once in `finish`, and each requested rank is
//! read with linear interpolation between neighbouring order statistics:
//! for `n` sorted values and rank `p`, `i = (n - 1) * p` and the result lies
//! between `sorted[floor(i)]` and `sorted[floor(i) + 1]`.

use super::CombineFn;

/// Quantile of an ascending slice, interpolating linearly between order statistics.
///
/// Returns `None` for an empty slice. `p` is clamped to `[0, 1]`.
///
/// ```
/// use evictprep::combiners::quantile_sorted;
///
/// let xs: Vec<f64> = (1..=100).map(f64::from).collect();
/// let q1 = quantile_sorted(&xs, 0.01).unwrap();
/// assert!((q1 - 1.99).abs() < 1e-9);
/// ```
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    if n == 1 || p <= 0.0 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let lo = sorted[i0];
    let hi = sorted[(i0 + 1).min(n - 1)];
    // multiply then add (two roundings), as d3 does
    Some(lo + (hi - lo) * (i - i0 as f64))
}

/// Exact quantiles at fixed ranks.
///
/// - Accumulator: `Vec<f64>` (all values)
/// - Output: one value per rank, in rank order; `None` when no value was added
///
/// NaN inputs are ignored.
#[derive(Clone, Debug)]
pub struct Quantiles {
    ranks: Vec<f64>,
}

impl Quantiles {
    #[must_use]
    pub fn new(ranks: Vec<f64>) -> Self {
        Self { ranks }
    }

    #[must_use]
    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }
}

impl CombineFn<f64, Vec<f64>, Option<Vec<f64>>> for Quantiles {
    fn create(&self) -> Vec<f64> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<f64>, v: f64) {
        if !v.is_nan() {
            acc.push(v);
        }
    }

    fn merge(&self, acc: &mut Vec<f64>, mut other: Vec<f64>) {
        acc.append(&mut other);
    }

    fn finish(&self, mut acc: Vec<f64>) -> Option<Vec<f64>> {
        if acc.is_empty() {
            return None;
        }
        acc.sort_by(f64::total_cmp);
        self.ranks
            .iter()
            .map(|&p| quantile_sorted(&acc, p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_between_order_statistics() {
        // i = 3 * 0.5 = 1.5 -> halfway between 2 and 3
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0, 4.0], 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0, 4.0], 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0, 4.0], 1.0), Some(4.0));
    }

    #[test]
    fn test_interpolation_rounds_like_d3() {
        // a fused multiply-add would give 0.11 here
        let xs: Vec<f64> = (1..=11).map(|k| f64::from(k) / 10.0).collect();
        let q1 = quantile_sorted(&xs, 0.01).unwrap();
        assert_eq!(q1.to_string(), "0.11000000000000001");
    }

    #[test]
    fn test_single_value_is_every_quantile() {
        assert_eq!(quantile_sorted(&[7.5], 0.01), Some(7.5));
        assert_eq!(quantile_sorted(&[7.5], 0.99), Some(7.5));
    }

    #[test]
    fn test_empty_has_no_quantile() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        let q = Quantiles::new(vec![0.5]);
        assert_eq!(q.finish(q.create()), None);
    }

    #[test]
    fn test_merge_then_finish_sorts_partials() {
        let q = Quantiles::new(vec![0.0, 0.5, 1.0]);
        let mut a = q.create();
        let mut b = q.create();
        for v in [9.0, 1.0] {
            q.add_input(&mut a, v);
        }
        for v in [5.0, f64::NAN] {
            q.add_input(&mut b, v);
        }
        q.merge(&mut a, b);
        assert_eq!(q.finish(a), Some(vec![1.0, 5.0, 9.0]));
    }
}
