//! Helpers for manipulating frontiers (sorted sets of LVs naming a version).

use crate::{Frontier, LV};

/// Frontiers should always be sorted smallest to largest.
pub(crate) fn frontier_is_sorted(frontier: &[LV]) -> bool {
    if frontier.len() >= 2 {
        let mut last = frontier[0];
        for &v in &frontier[1..] {
            debug_assert!(v != last);
            if last > v { return false; }
            last = v;
        }
    }
    true
}

pub(crate) fn debug_assert_frontier_sorted(frontier: &[LV]) {
    debug_assert!(frontier_is_sorted(frontier));
}

/// Sort a frontier which may have been assembled out of order - eg after
/// translating remote parent ids, since remote LV order doesn't match ours.
pub(crate) fn sort_frontier(frontier: &mut Frontier) {
    if !frontier_is_sorted(frontier) {
        frontier.sort_unstable();
    }
}

pub(crate) fn add_to_frontier(frontier: &mut Frontier, new_item: LV) {
    // Binary search might be slower than a linear scan here, but frontiers are
    // tiny either way.
    let new_idx = frontier.binary_search(&new_item).unwrap_err();
    frontier.insert(new_idx, new_item);
    debug_assert_frontier_sorted(frontier);
}

/// Advance a frontier by a single operation: `sort((frontier \ parents) u
/// {new_item})`.
pub(crate) fn advance_frontier(frontier: &mut Frontier, new_item: LV, parents: &[LV]) {
    if parents.len() == 1 && frontier.len() == 1 && parents[0] == frontier[0] {
        // Short circuit the common case where time is just advancing linearly.
        frontier[0] = new_item;
        return;
    } else if frontier.as_slice() == parents {
        frontier.clear();
        frontier.push(new_item);
        return;
    }

    debug_assert!(!frontier.contains(&new_item), "operation already in the frontier");
    debug_assert_frontier_sorted(frontier);

    frontier.retain(|v| !parents.contains(v)); // Usually removes all elements.
    add_to_frontier(frontier, new_item);
}

pub fn local_frontier_eq(a: &[LV], b: &[LV]) -> bool {
    // Frontiers are canonically sorted, so slice equality is set equality.
    debug_assert_frontier_sorted(a);
    debug_assert_frontier_sorted(b);
    a == b
}

#[allow(unused)]
pub(crate) fn local_frontier_is_root(frontier: &[LV]) -> bool {
    frontier.is_empty()
}
