//! Property tests for `RangeSet` against a brute-force coverage oracle.

use kiln_ssa::RangeSet;
use num_bigint::BigInt;
use proptest::prelude::*;

fn interval() -> impl Strategy<Value = (i64, i64)> {
    (-20i64..20, 0i64..6).prop_map(|(first, width)| (first, first + width))
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in interval(), b in interval()) {
        let mut ab = RangeSet::new();
        ab.add_range(BigInt::from(a.0), BigInt::from(a.1), 'a');
        let ab_conflict = ab.add_range(BigInt::from(b.0), BigInt::from(b.1), 'b').is_some();

        let mut ba = RangeSet::new();
        ba.add_range(BigInt::from(b.0), BigInt::from(b.1), 'b');
        let ba_conflict = ba.add_range(BigInt::from(a.0), BigInt::from(a.1), 'a').is_some();

        prop_assert_eq!(ab_conflict, ba_conflict);
        let shares_value = (a.0..=a.1).any(|v| (b.0..=b.1).contains(&v));
        prop_assert_eq!(ab_conflict, shares_value);
    }

    #[test]
    fn spans_matches_oracle(
        ranges in prop::collection::vec(interval(), 0..8),
        first in -20i64..20,
        width in 0i64..20,
    ) {
        let last = first + width;
        let mut set = RangeSet::new();
        let mut accepted = Vec::new();
        for (idx, &(f, l)) in ranges.iter().enumerate() {
            if set.add_range(BigInt::from(f), BigInt::from(l), idx).is_none() {
                accepted.push((f, l));
            }
        }

        let covered = |v: i64| accepted.iter().any(|&(f, l)| f <= v && v <= l);
        let min = accepted.iter().map(|r| r.0).min();
        let max = accepted.iter().map(|r| r.1).max();
        let oracle = min == Some(first)
            && max == Some(last)
            && (first..=last).all(covered);

        prop_assert_eq!(set.spans(&BigInt::from(first), &BigInt::from(last)), oracle);
    }

    #[test]
    fn rejected_range_leaves_set_unchanged(a in interval(), b in interval()) {
        let mut set = RangeSet::new();
        set.add_range(BigInt::from(a.0), BigInt::from(a.1), 0);
        let before = set.len();
        if set.add_range(BigInt::from(b.0), BigInt::from(b.1), 1).is_some() {
            prop_assert_eq!(set.len(), before);
        }
    }
}
