//! A fast resettable vector based on timestamps — the `LazyClearVector<T>`
//! of §5: per-slot generation counter, `reset()` increments a global
//! generation in amortised O(1), reads of a stale slot return `T::DEFAULT`.
//! `unsettled`/`settled` label arrays and the landmark-potential distance
//! arrays are all backed by this, so a new query never pays for clearing the
//! previous one's state node-by-node.

use crate::util::in_range_option::*;
use std::fmt::Debug;
use std::ops::{Index, IndexMut};

pub trait Reset: Clone {
    const DEFAULT: Self;
    fn reset(&mut self) {
        *self = Self::DEFAULT;
    }
}

impl Reset for i64 {
    const DEFAULT: Self = crate::datastr::graph::INFINITY;
}
impl Reset for bool {
    const DEFAULT: Self = false;
}
impl Reset for u32 {
    const DEFAULT: Self = crate::datastr::graph::INVALID_ID;
}
impl<T: Clone> Reset for Vec<T> {
    const DEFAULT: Self = vec![];
    fn reset(&mut self) {
        self.clear()
    }
}
impl<R: Reset + Sentinel + Debug> Reset for InRangeOption<R> {
    const DEFAULT: Self = InRangeOption::NONE;
}
impl<R: Reset> Reset for Option<R> {
    const DEFAULT: Self = None;
}

/// A fast resettable vector based on 32bit timestamps. When only a handful
/// of entries get touched per query, a timestamp/generation check beats
/// clearing the whole backing `Vec` (§5: "`clear()` increments the global
/// generation ... O(1) except every 255 clears").
#[derive(Debug, Clone)]
pub struct TimestampedVector<T> {
    data: Vec<T>,
    current: u32,
    timestamps: Vec<u32>,
    default: T,
}

impl<T: Reset> TimestampedVector<T> {
    pub fn new(size: usize) -> TimestampedVector<T> {
        TimestampedVector {
            data: vec![T::DEFAULT; size],
            current: 0,
            timestamps: vec![0; size],
            default: T::DEFAULT,
        }
    }

    pub fn new_with_default(size: usize, default: T) -> TimestampedVector<T> {
        TimestampedVector {
            data: vec![default.clone(); size],
            current: 0,
            timestamps: vec![0; size],
            default,
        }
    }

    /// Reset all elements to the default. Amortised O(1); a full sweep only
    /// happens on timestamp overflow, roughly every `u32::MAX` resets.
    pub fn reset(&mut self) {
        let (new, overflow) = self.current.overflowing_add(1);
        self.current = new;

        if overflow {
            for element in &mut self.data {
                element.reset();
            }
        }
    }

    /// Update an individual element. Slightly cheaper than `index_mut`
    /// because no "is this slot stale" branch is needed first.
    pub fn set(&mut self, index: usize, value: T) {
        self.data[index] = value;
        self.timestamps[index] = self.current;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Reset> Index<usize> for TimestampedVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        if self.timestamps[index] == self.current {
            &self.data[index]
        } else {
            &self.default
        }
    }
}

impl<T: Reset> IndexMut<usize> for TimestampedVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        if self.timestamps[index] != self.current {
            self.timestamps[index] = self.current;
            self.data[index].reset();
        }
        &mut self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_reads_return_default() {
        let mut v: TimestampedVector<i64> = TimestampedVector::new(4);
        v.set(2, 7);
        assert_eq!(v[2], 7);
        v.reset();
        assert_eq!(v[2], crate::datastr::graph::INFINITY);
    }

    #[test]
    fn index_mut_resets_stale_slot_first() {
        let mut v: TimestampedVector<Vec<u32>> = TimestampedVector::new(2);
        v[0].push(1);
        v.reset();
        v[0].push(2);
        assert_eq!(v[0], vec![2]);
    }
}
