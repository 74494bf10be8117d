use jumprope::JumpRopeBuf;

use crate::{AgentId, LV};
use crate::frontier::local_frontier_eq;
use crate::list::{ListBranch, ListOpLog};

impl Default for ListBranch {
    fn default() -> Self {
        Self::new()
    }
}

impl ListBranch {
    /// Create a new branch at the root (empty) version.
    pub fn new() -> Self {
        Self {
            version: Default::default(),
            content: JumpRopeBuf::new(),
        }
    }

    /// The document's length, in chars.
    pub fn len(&self) -> usize {
        self.content.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn content(&self) -> &JumpRopeBuf {
        &self.content
    }

    pub fn local_version(&self) -> &[LV] {
        &self.version
    }

    /// Author an insert on this branch, appending it to the oplog and
    /// splicing the snapshot directly. The branch must be at the oplog's
    /// frontier - which it always is when edits go through the branch - so no
    /// replay is needed to see the effect of our own edit.
    pub fn insert(&mut self, oplog: &mut ListOpLog, agent: AgentId, pos: usize, content: &str) -> LV {
        assert!(pos <= self.len(), "Insert position beyond the end of the document");
        debug_assert!(local_frontier_eq(&self.version, &oplog.cg.version),
                      "Branch must be at the oplog frontier to edit directly");

        let lv = oplog.add_insert(agent, pos, content);
        self.content.insert(pos, content);
        self.version = oplog.cg.version.clone();
        lv
    }

    /// Author a deletion of `len` chars from `pos`. Same fast path rules as
    /// [`ListBranch::insert`].
    pub fn delete(&mut self, oplog: &mut ListOpLog, agent: AgentId, pos: usize, len: usize) -> LV {
        assert!(len > 0, "Cannot delete an empty range");
        assert!(pos + len <= self.len(), "Delete range beyond the end of the document");
        debug_assert!(local_frontier_eq(&self.version, &oplog.cg.version),
                      "Branch must be at the oplog frontier to edit directly");

        let lv = oplog.add_delete(agent, pos..pos + len);
        self.content.remove(pos..pos + len);
        self.version = oplog.cg.version.clone();
        lv
    }

    /// Move this branch to the named version by replaying the oplog from
    /// scratch, replacing the content wholesale.
    pub fn merge(&mut self, oplog: &ListOpLog, version: &[LV]) {
        *self = oplog.checkout(version);
    }
}

#[cfg(test)]
mod tests {
    use crate::list::{ListBranch, ListOpLog};

    #[test]
    fn edits_splice_without_replay() {
        let mut oplog = ListOpLog::new();
        let agent = oplog.get_or_create_agent_id("seph");
        let mut branch = ListBranch::new();

        branch.insert(&mut oplog, agent, 0, "hello up there");
        branch.delete(&mut oplog, agent, 5, 3);
        assert_eq!(branch.content().to_string(), "hello there");
        assert_eq!(branch.len(), 11);

        // The fast path must agree with a full replay.
        assert_eq!(oplog.checkout_tip(), branch);
    }

    #[test]
    fn merge_moves_between_versions() {
        let mut oplog = ListOpLog::new();
        let agent = oplog.get_or_create_agent_id("seph");
        let mut branch = ListBranch::new();
        let v1 = branch.insert(&mut oplog, agent, 0, "aaa");
        branch.insert(&mut oplog, agent, 3, "bbb");

        let mut old = ListBranch::new();
        old.merge(&oplog, &[v1]);
        assert_eq!(old.content().to_string(), "aaa");

        old.merge(&oplog, oplog.local_version());
        assert_eq!(old, branch);
    }
}
