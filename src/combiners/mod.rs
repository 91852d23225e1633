//! Reusable reductions over a stream of values.
//!
//! A combiner folds values into an accumulator (`create` / `add_input`), can
//! join two partial accumulators (`merge`) and turns the final accumulator
//! into an output (`finish`). The extents reducer builds one accumulator per
//! column and merges per-partition accumulators when running in parallel.
//!
//! - [`Min<T>`] / [`Max<T>`] -- smallest / largest value (`T: Ord`).
//! - [`Quantiles`] -- exact quantiles with linear interpolation.
//! - [`Extent`] -- min, max, 1st and 99th percentile of an `f64` column.
//!
//! ```
//! use evictprep::combiners::{CombineFn, Quantiles};
//!
//! let q = Quantiles::new(vec![0.5]);
//! let mut acc = q.create();
//! for v in [3.0, 1.0, 2.0] {
//!     q.add_input(&mut acc, v);
//! }
//! assert_eq!(q.finish(acc), Some(vec![2.0]));
//! ```

mod basic;
mod extent;
mod quantiles;

pub use basic::{Max, Min};
pub use extent::{Extent, ExtentAcc, ExtentStats};
pub use quantiles::{Quantiles, quantile_sorted};

/// An associative reduction from values `V` through accumulator `A` to output `O`.
pub trait CombineFn<V, A, O>: Send + Sync {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}
