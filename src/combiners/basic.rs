//! Order-based combiners: Min, Max

use super::CombineFn;
use std::marker::PhantomData;

/* ===================== Min<T> ===================== */

/// Smallest value seen (requires `Ord`).
///
/// - Accumulator: `Option<T>`
/// - Output: `Option<T>`, `None` when no value was added
#[derive(Clone, Copy, Debug, Default)]
pub struct Min<T>(pub PhantomData<T>);
impl<T> Min<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, Option<T>> for Min<T>
where
    T: Ord + Send + Sync,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) {
        match acc {
            Some(cur) if *cur <= v => {}
            _ => *acc = Some(v),
        }
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) {
        if let Some(b) = other {
            self.add_input(acc, b);
        }
    }

    fn finish(&self, acc: Option<T>) -> Option<T> {
        acc
    }
}

/* ===================== Max<T> ===================== */

/// Largest value seen (requires `Ord`).
///
/// - Accumulator: `Option<T>`
/// - Output: `Option<T>`, `None` when no value was added
#[derive(Clone, Copy, Debug, Default)]
pub struct Max<T>(pub PhantomData<T>);
impl<T> Max<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, Option<T>> for Max<T>
where
    T: Ord + Send + Sync,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) {
        match acc {
            Some(cur) if *cur >= v => {}
            _ => *acc = Some(v),
        }
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) {
        if let Some(b) = other {
            self.add_input(acc, b);
        }
    }

    fn finish(&self, acc: Option<T>) -> Option<T> {
        acc
    }
}
