//! Column extent: min, max and the 1st / 99th percentiles.

use super::{CombineFn, Max, Min, Quantiles};
use ordered_float::OrderedFloat;

/// Ranks reported as `q1` and `q99`.
pub const EXTENT_RANKS: [f64; 2] = [0.01, 0.99];

/// Finished extent of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtentStats {
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q99: f64,
}

/// Accumulator for [`Extent`].
#[derive(Clone, Debug, Default)]
pub struct ExtentAcc {
    min: Option<OrderedFloat<f64>>,
    max: Option<OrderedFloat<f64>>,
    values: Vec<f64>,
}

impl ExtentAcc {
    /// Number of values folded in so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

/// Min / max / q1 / q99 of an `f64` column.
///
/// - Accumulator: [`ExtentAcc`]
/// - Output: `Option<ExtentStats>`, `None` when the column had no values
#[derive(Clone, Debug)]
pub struct Extent {
    min: Min<OrderedFloat<f64>>,
    max: Max<OrderedFloat<f64>>,
    quantiles: Quantiles,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min: Min::new(),
            max: Max::new(),
            quantiles: Quantiles::new(EXTENT_RANKS.to_vec()),
        }
    }
}

impl CombineFn<f64, ExtentAcc, Option<ExtentStats>> for Extent {
    fn create(&self) -> ExtentAcc {
        ExtentAcc::default()
    }

    fn add_input(&self, acc: &mut ExtentAcc, v: f64) {
        if v.is_nan() {
            return;
        }
        self.min.add_input(&mut acc.min, OrderedFloat(v));
        self.max.add_input(&mut acc.max, OrderedFloat(v));
        self.quantiles.add_input(&mut acc.values, v);
    }

    fn merge(&self, acc: &mut ExtentAcc, other: ExtentAcc) {
        self.min.merge(&mut acc.min, other.min);
        self.max.merge(&mut acc.max, other.max);
        self.quantiles.merge(&mut acc.values, other.values);
    }

    fn finish(&self, acc: ExtentAcc) -> Option<ExtentStats> {
        let min = self.min.finish(acc.min)?.into_inner();
        let max = self.max.finish(acc.max)?.into_inner();
        let qs = self.quantiles.finish(acc.values)?;
        Some(ExtentStats {
            min,
            max,
            q1: qs[0],
            q99: qs[1],
        })
    }
}
