//! Free-slot computation and allocation within category capacity bounds.
//!
//! The complement of the used-number set is exposed two ways: as minimal
//! closed intervals for display (`4-6, 8-10`) and as an ascending flat list
//! for allocation. Allocation never hands out a number in the exclusion
//! set; a short result means the pool is exhausted and the caller must
//! treat the parent operation as failed, not partially applied.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::core::catalog::Category;

/// Complement of `used` within the category's bounds, as minimal closed
/// intervals in ascending order.
pub fn free_intervals(category: &Category, used: &BTreeSet<u16>) -> Vec<(u16, u16)> {
    let (low, high) = category.bounds;
    let mut intervals = Vec::new();
    let mut start: Option<u16> = None;

    for n in low..=high {
        match (used.contains(&n), start) {
            (false, None) => start = Some(n),
            (true, Some(s)) => {
                intervals.push((s, n - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        intervals.push((s, high));
    }
    intervals
}

/// Render intervals the way the usage report displays them: `4-6, 8, 10-12`.
pub fn format_intervals(intervals: &[(u16, u16)]) -> String {
    intervals
        .iter()
        .map(|&(a, b)| {
            if a == b {
                a.to_string()
            } else {
                format!("{a}-{b}")
            }
        })
        .join(", ")
}

/// Up to `count` unused numbers, ascending, drawn from the intersection of
/// the category bounds and the optional `low`/`high` restriction, skipping
/// everything in `exclude`.
///
/// Returns fewer than `count` numbers when the range is exhausted; callers
/// must treat a short result as total failure of the enclosing operation.
pub fn allocate(
    category: &Category,
    count: usize,
    low: Option<u16>,
    high: Option<u16>,
    exclude: &BTreeSet<u16>,
) -> Vec<u16> {
    let lo = low.map_or(category.bounds.0, |l| l.max(category.bounds.0));
    let hi = high.map_or(category.bounds.1, |h| h.min(category.bounds.1));
    if lo > hi {
        return Vec::new();
    }

    (lo..=hi)
        .filter(|n| !exclude.contains(n))
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Catalog, CategoryCode};

    use proptest::prelude::*;

    fn used(ns: &[u16]) -> BTreeSet<u16> {
        ns.iter().copied().collect()
    }

    #[test]
    fn complement_as_minimal_intervals() {
        let catalog = Catalog::sel400();
        let mut cat = catalog.get(CategoryCode::Plt).clone();
        cat.bounds = (1, 10);

        assert_eq!(
            free_intervals(&cat, &used(&[1, 2, 3, 7])),
            vec![(4, 6), (8, 10)]
        );
        assert_eq!(free_intervals(&cat, &used(&[])), vec![(1, 10)]);
        assert_eq!(
            free_intervals(&cat, &used(&(1..=10).collect::<Vec<_>>())),
            Vec::<(u16, u16)>::new()
        );
    }

    #[test]
    fn interval_rendering() {
        assert_eq!(format_intervals(&[(4, 6), (8, 8), (10, 12)]), "4-6, 8, 10-12");
        assert_eq!(format_intervals(&[]), "");
    }

    #[test]
    fn exhausted_pool_yields_short_result() {
        let catalog = Catalog::sel400();
        let mut cat = catalog.get(CategoryCode::Plt).clone();
        cat.bounds = (1, 3);

        assert!(allocate(&cat, 1, None, None, &used(&[1, 2, 3])).is_empty());
        assert_eq!(allocate(&cat, 5, None, None, &used(&[2])), vec![1, 3]);
    }

    #[test]
    fn bounds_and_restrictions_clamp() {
        let catalog = Catalog::sel400();
        let cat = catalog.get(CategoryCode::Plt); // bounds 1..=32

        assert_eq!(allocate(cat, 2, Some(30), None, &used(&[])), vec![30, 31]);
        assert_eq!(allocate(cat, 9, Some(40), None, &used(&[])), Vec::<u16>::new());
        assert_eq!(
            allocate(cat, 3, Some(5), Some(6), &used(&[5])),
            vec![6]
        );
    }

    proptest! {
        /// Free intervals partition exactly the unused numbers: every
        /// number in an interval is unused, and the interval population
        /// plus the in-bounds used count covers the whole pool.
        #[test]
        fn intervals_partition_complement(used_ns in proptest::collection::btree_set(1u16..=32, 0..32)) {
            let catalog = Catalog::sel400();
            let cat = catalog.get(CategoryCode::Plt);
            let intervals = free_intervals(cat, &used_ns);

            let mut free_count = 0u16;
            for (a, b) in &intervals {
                prop_assert!(a <= b);
                for n in *a..=*b {
                    prop_assert!(!used_ns.contains(&n));
                }
                free_count += b - a + 1;
            }
            let in_bounds_used = used_ns.iter().filter(|n| cat.contains(**n)).count() as u16;
            prop_assert_eq!(free_count + in_bounds_used, cat.capacity());

            // Minimality: adjacent intervals never touch.
            for w in intervals.windows(2) {
                prop_assert!(w[0].1 + 1 < w[1].0);
            }
        }

        /// Allocation never returns an excluded or out-of-bounds number and
        /// is strictly ascending.
        #[test]
        fn allocation_respects_exclusions(
            exclude in proptest::collection::btree_set(1u16..=32, 0..32),
            count in 0usize..40,
        ) {
            let catalog = Catalog::sel400();
            let cat = catalog.get(CategoryCode::Plt);
            let got = allocate(cat, count, None, None, &exclude);

            prop_assert!(got.len() <= count);
            for n in &got {
                prop_assert!(cat.contains(*n));
                prop_assert!(!exclude.contains(n));
            }
            for w in got.windows(2) {
                prop_assert!(w[0] < w[1]);
            }
            // Short only when the pool genuinely ran out.
            if got.len() < count {
                let available = (cat.bounds.0..=cat.bounds.1)
                    .filter(|n| !exclude.contains(n))
                    .count();
                prop_assert_eq!(got.len(), available);
            }
        }
    }
}
