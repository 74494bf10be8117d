//! Tools for treating the causal graph as a time DAG: ancestry queries and
//! diffs between versions. Everything in here is pure - nothing mutates the
//! graph.

use std::collections::BinaryHeap;

use smallvec::{smallvec, SmallVec};

use crate::LV;
use crate::causalgraph::CausalGraph;
use crate::frontier::debug_assert_frontier_sorted;

/// The diff walk needs to tag each entry in the queue based on whether its
/// part of a's history, b's history or both, without changing the heap order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DiffFlag { OnlyA, OnlyB, Shared }

/// `(only_a, only_b)`, both in descending LV order.
pub type DiffResult = (SmallVec<[LV; 4]>, SmallVec<[LV; 4]>);

impl CausalGraph {
    /// Does `frontier` dominate (contain in its transitive history) `target`?
    pub fn version_contains_lv(&self, frontier: &[LV], target: LV) -> bool {
        if frontier.contains(&target) { return true; }

        let mut queue: BinaryHeap<LV> = frontier.iter().copied()
            .filter(|&v| v > target)
            .collect();

        while let Some(v) = queue.pop() {
            // The same version can be queued twice via different children.
            while queue.peek() == Some(&v) { queue.pop(); }

            for &p in self.parents_at(v) {
                if p == target { return true; }
                // Anything below the target can only have even smaller
                // ancestors, so there's no point descending further.
                else if p > target { queue.push(p); }
            }
        }

        false
    }

    /// The reflexive-transitive closure of `frontier` over the parent edges,
    /// sorted ascending. This is every operation visible at that version.
    pub fn version_closure(&self, frontier: &[LV]) -> Vec<LV> {
        let mut visited = vec![false; self.len()];
        let mut stack: Vec<LV> = frontier.to_vec();

        // Terminates because LVs strictly decrease along parent edges.
        while let Some(v) = stack.pop() {
            if visited[v] { continue; }
            visited[v] = true;
            stack.extend_from_slice(self.parents_at(v));
        }

        visited.iter().enumerate()
            .filter_map(|(lv, &hit)| hit.then_some(lv))
            .collect()
    }

    /// Returns `(closure(a) \ closure(b), closure(b) \ closure(a))`, each in
    /// descending LV order.
    ///
    /// This walks down from both frontiers at once rather than expanding
    /// either closure in full, stopping as soon as every remaining queue entry
    /// is shared history.
    pub fn diff(&self, a: &[LV], b: &[LV]) -> DiffResult {
        debug_assert_frontier_sorted(a);
        debug_assert_frontier_sorted(b);

        // Most of the time one operation simply follows the other.
        if a == b { return (smallvec![], smallvec![]); }

        let mut queue: BinaryHeap<(LV, DiffFlag)> = BinaryHeap::new();
        for &v in a { queue.push((v, DiffFlag::OnlyA)); }
        for &v in b { queue.push((v, DiffFlag::OnlyB)); }

        let mut num_shared_entries = 0;
        let mut only_a = smallvec![];
        let mut only_b = smallvec![];

        while queue.len() > num_shared_entries {
            let (lv, mut flag) = queue.pop().unwrap();
            if flag == DiffFlag::Shared { num_shared_entries -= 1; }

            // Merge any queued duplicates of this version.
            while let Some(&(peek_lv, peek_flag)) = queue.peek() {
                if peek_lv != lv { break; }
                queue.pop();
                if peek_flag == DiffFlag::Shared { num_shared_entries -= 1; }
                if peek_flag != flag { flag = DiffFlag::Shared; }
            }

            match flag {
                DiffFlag::OnlyA => only_a.push(lv),
                DiffFlag::OnlyB => only_b.push(lv),
                DiffFlag::Shared => {}
            }

            for &p in self.parents_at(lv) {
                queue.push((p, flag));
                if flag == DiffFlag::Shared { num_shared_entries += 1; }
            }
        }

        (only_a, only_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds this graph:
    ///
    /// ```text
    ///     0
    ///    / \
    ///   1   2
    ///   |   |
    ///   3   4
    ///    \ /
    ///     5
    /// ```
    fn fancy_graph() -> CausalGraph {
        let mut cg = CausalGraph::new();
        let a = cg.get_or_create_agent_id("a");
        let b = cg.get_or_create_agent_id("b");

        cg.assign_op_with_parents(&[], a);     // 0
        cg.assign_op_with_parents(&[0], a);    // 1
        cg.assign_op_with_parents(&[0], b);    // 2
        cg.assign_op_with_parents(&[1], a);    // 3
        cg.assign_op_with_parents(&[2], b);    // 4
        cg.assign_op_with_parents(&[3, 4], a); // 5
        cg.dbg_check();
        cg
    }

    #[test]
    fn contains_smoke_test() {
        let cg = fancy_graph();
        assert!(cg.version_contains_lv(&[5], 0));
        assert!(cg.version_contains_lv(&[5], 4));
        assert!(cg.version_contains_lv(&[3], 1));
        assert!(!cg.version_contains_lv(&[3], 2));
        assert!(!cg.version_contains_lv(&[1, 2], 3));
        assert!(cg.version_contains_lv(&[1, 2], 2));
        assert!(!cg.version_contains_lv(&[], 0));
    }

    #[test]
    fn closure_smoke_test() {
        let cg = fancy_graph();
        assert_eq!(cg.version_closure(&[]), Vec::<LV>::new());
        assert_eq!(cg.version_closure(&[1]), vec![0, 1]);
        assert_eq!(cg.version_closure(&[3, 4]), vec![0, 1, 2, 3, 4]);
        assert_eq!(cg.version_closure(&[5]), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn diff_smoke_test() {
        let cg = fancy_graph();

        let (only_a, only_b) = cg.diff(&[3], &[4]);
        assert_eq!(only_a.as_slice(), &[3, 1]);
        assert_eq!(only_b.as_slice(), &[4, 2]);

        let (only_a, only_b) = cg.diff(&[5], &[3]);
        assert_eq!(only_a.as_slice(), &[5, 4, 2]);
        assert!(only_b.is_empty());

        let (only_a, only_b) = cg.diff(&[2], &[2]);
        assert!(only_a.is_empty());
        assert!(only_b.is_empty());

        let (only_a, only_b) = cg.diff(&[1, 2], &[0]);
        assert_eq!(only_a.as_slice(), &[2, 1]);
        assert!(only_b.is_empty());
    }

    /// The accelerated diff must produce exactly the closure set differences.
    fn check_diff_matches_closure(cg: &CausalGraph, a: &[LV], b: &[LV]) {
        let (only_a, only_b) = cg.diff(a, b);

        let ca = cg.version_closure(a);
        let cb = cg.version_closure(b);
        let expect_a: Vec<LV> = ca.iter().copied().filter(|v| !cb.contains(v)).rev().collect();
        let expect_b: Vec<LV> = cb.iter().copied().filter(|v| !ca.contains(v)).rev().collect();

        assert_eq!(only_a.as_slice(), expect_a.as_slice());
        assert_eq!(only_b.as_slice(), expect_b.as_slice());
    }

    #[test]
    fn diff_matches_closure_difference() {
        let cg = fancy_graph();
        let frontiers: &[&[LV]] = &[&[], &[0], &[1], &[2], &[3], &[4], &[5], &[1, 2], &[3, 4], &[1, 4]];
        for a in frontiers {
            for b in frontiers {
                check_diff_matches_closure(&cg, a, b);
            }
        }
    }

    #[test]
    fn diff_random_graphs() {
        use rand::prelude::*;

        for seed in 0..10 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut cg = CausalGraph::new();
            let agents = [
                cg.get_or_create_agent_id("a"),
                cg.get_or_create_agent_id("b"),
                cg.get_or_create_agent_id("c"),
            ];

            for _ in 0..40 {
                let agent = agents[rng.gen_range(0..agents.len())];
                if cg.is_empty() || rng.gen_bool(0.2) {
                    cg.assign_op_with_parents(&[], agent);
                } else {
                    // Pick 1-2 existing ops and reduce them to an antichain.
                    let x = rng.gen_range(0..cg.len());
                    let y = rng.gen_range(0..cg.len());
                    let mut parents = vec![x];
                    if y != x
                        && !cg.version_contains_lv(&[x], y)
                        && !cg.version_contains_lv(&[y], x)
                    {
                        parents.push(y);
                    }
                    parents.sort_unstable();
                    cg.assign_op_with_parents(&parents, agent);
                }
            }
            cg.dbg_check();

            for _ in 0..30 {
                let a = rng.gen_range(0..cg.len());
                let b = rng.gen_range(0..cg.len());
                check_diff_matches_closure(&cg, &[a], &[b]);
            }
            check_diff_matches_closure(&cg, &cg.version.clone(), &[0]);
        }
    }
}
