//! # Order Picker
//!
//! Sources of the `order` value drawn during random card selection.
//!
//! This module provides the [`OrderPicker`] trait and two implementations:
//! a thread-local RNG for production and a fixed value for deterministic
//! tests.

use std::fmt;
use std::ops::RangeInclusive;

/// Draws one value from an inclusive order range.
pub trait OrderPicker: Send + Sync + fmt::Debug {
    /// Returns a value in `range`.
    ///
    /// An empty range yields its start.
    fn pick(&self, range: RangeInclusive<i64>) -> i64;

    /// Returns the name of this picker.
    fn name(&self) -> &'static str;
}

/// Uniform draw from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngOrderPicker;

impl ThreadRngOrderPicker {
    /// Creates a new thread RNG picker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OrderPicker for ThreadRngOrderPicker {
    fn pick(&self, range: RangeInclusive<i64>) -> i64 {
        if range.is_empty() {
            return *range.start();
        }
        rand::random_range(range)
    }

    fn name(&self) -> &'static str {
        "thread_rng"
    }
}

/// Always returns the same value, clamped into the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOrderPicker {
    value: i64,
}

impl FixedOrderPicker {
    /// Creates a picker that always returns `value`.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self { value }
    }

    /// Returns the fixed value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }
}

impl OrderPicker for FixedOrderPicker {
    fn pick(&self, range: RangeInclusive<i64>) -> i64 {
        if range.is_empty() {
            return *range.start();
        }
        self.value.clamp(*range.start(), *range.end())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn thread_rng_stays_in_range() {
        let picker = ThreadRngOrderPicker::new();
        for _ in 0..500 {
            let value = picker.pick(1..=3);
            assert!((1..=3).contains(&value));
        }
    }

    #[test]
    fn thread_rng_hits_every_value() {
        let picker = ThreadRngOrderPicker::new();
        let mut counts = BTreeMap::new();
        for _ in 0..3_000 {
            *counts.entry(picker.pick(1..=3)).or_insert(0_u32) += 1;
        }
        assert_eq!(counts.len(), 3);
        for (value, count) in counts {
            assert!(count > 700, "order {value} drawn only {count} times");
        }
    }

    #[test]
    fn thread_rng_single_value_range() {
        assert_eq!(ThreadRngOrderPicker::new().pick(5..=5), 5);
    }

    #[test]
    fn empty_range_yields_start() {
        #[allow(clippy::reversed_empty_ranges)]
        let range = 3..=1;
        assert_eq!(ThreadRngOrderPicker::new().pick(range.clone()), 3);
        assert_eq!(FixedOrderPicker::new(2).pick(range), 3);
    }

    #[test]
    fn fixed_picker_is_clamped() {
        assert_eq!(FixedOrderPicker::new(2).pick(1..=3), 2);
        assert_eq!(FixedOrderPicker::new(9).pick(1..=3), 3);
        assert_eq!(FixedOrderPicker::new(-4).pick(1..=3), 1);
    }

    #[test]
    fn names() {
        assert_eq!(ThreadRngOrderPicker.name(), "thread_rng");
        assert_eq!(FixedOrderPicker::new(1).name(), "fixed");
    }
}
