use crate::frontier::frontier_is_sorted;
use crate::list::ListCRDT;

impl ListCRDT {
    /// Re-run the replay engine and compare it against the cached snapshot.
    /// A mismatch means the local fast-path mutator diverged from the oplog -
    /// a bug in the caller (editing against a stale branch) or in us.
    pub fn check(&self) {
        let expected = self.oplog.checkout(self.branch.local_version());
        assert_eq!(expected.content().to_string(), self.branch.content().to_string(),
                   "Branch content is out of sync with the oplog");
    }

    /// Check all internal invariants. This is slow - its for tests and
    /// debugging.
    pub fn dbg_check(&self, deep: bool) {
        self.oplog.dbg_check();

        assert!(frontier_is_sorted(self.branch.local_version()));
        for &v in self.branch.local_version() {
            assert!(v < self.oplog.len(), "Branch version not in the oplog");
            // Frontiers are minimal: no entry is in another entry's history.
            let rest: Vec<_> = self.branch.local_version().iter()
                .copied().filter(|&o| o != v).collect();
            assert!(!self.oplog.cg.version_contains_lv(&rest, v),
                    "Branch version contains a redundant entry");
        }

        if deep {
            self.check();
        }
    }
}
