//! Switch exhaustiveness over integer intervals.
//!
//! A [`RangeSet`] collects the inclusive `[first, last]` intervals of one
//! `switch` expression's case items as they are analysed. Each interval
//! remembers its `source` (the AST node it came from) so that a conflict
//! can point back at the earlier case.
//!
//! [`RangeSet::spans`] decides whether the merged intervals cover exactly
//! one target interval, which is how a switch over the full value range of
//! its subject type is found to need no default.

use std::mem;

use num_bigint::BigInt;
use num_traits::One;

/// One inclusive interval plus the node it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeWithSrc<S> {
    pub first: BigInt,
    pub last: BigInt,
    pub source: S,
}

/// Unordered interval list for one switch.
#[derive(Clone, Debug)]
pub struct RangeSet<S> {
    ranges: Vec<RangeWithSrc<S>>,
}

impl<S> Default for RangeSet<S> {
    fn default() -> Self {
        Self { ranges: Vec::new() }
    }
}

impl<S: Clone> RangeSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `[first, last]`.
    ///
    /// Returns the source of the first existing interval that shares at
    /// least one value with the new one, leaving the set untouched.
    /// Touching intervals (`existing.last + 1 == first`) do not conflict.
    pub fn add_range(&mut self, first: BigInt, last: BigInt, source: S) -> Option<S> {
        debug_assert!(first <= last, "range bounds out of order");
        if let Some(existing) = self
            .ranges
            .iter()
            .find(|r| first <= r.last && last >= r.first)
        {
            return Some(existing.source.clone());
        }
        self.ranges.push(RangeWithSrc {
            first,
            last,
            source,
        });
        None
    }

    /// Whether the union of all intervals is exactly `[first, last]`.
    ///
    /// Merges overlapping or adjacent intervals between two working lists
    /// until a full pass merges nothing, then checks that a single interval
    /// with exactly these bounds remains.
    pub fn spans(&self, first: &BigInt, last: &BigInt) -> bool {
        let mut current: Vec<(BigInt, BigInt)> = self
            .ranges
            .iter()
            .map(|r| (r.first.clone(), r.last.clone()))
            .collect();
        let mut other: Vec<(BigInt, BigInt)> = Vec::with_capacity(current.len());

        loop {
            let mut merged = false;
            for (cand_first, cand_last) in current.drain(..) {
                let target = other.iter_mut().find(|(o_first, o_last)| {
                    let overlaps = cand_first <= *o_last && cand_last >= *o_first;
                    let below = &cand_last + BigInt::one() == *o_first;
                    let above = &*o_last + BigInt::one() == cand_first;
                    overlaps || below || above
                });
                match target {
                    Some((o_first, o_last)) => {
                        if cand_first < *o_first {
                            *o_first = cand_first;
                        }
                        if cand_last > *o_last {
                            *o_last = cand_last;
                        }
                        merged = true;
                    }
                    None => other.push((cand_first, cand_last)),
                }
            }
            mem::swap(&mut current, &mut other);
            if !merged {
                break;
            }
        }

        matches!(current.as_slice(), [(f, l)] if f == first && l == last)
    }

    /// Whether any interval contains `value`.
    pub fn covers(&self, value: &BigInt) -> bool {
        self.ranges
            .iter()
            .any(|r| r.first <= *value && *value <= r.last)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Intervals in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RangeWithSrc<S>> {
        self.ranges.iter()
    }
}
