use std::ops::Range;

use str_indices::chars::count as count_chars;

use crate::{AgentId, LV};
use crate::frontier::frontier_is_sorted;
use crate::list::{ListBranch, ListOpLog};
use crate::list::operation::{ListOp, ListOpKind};
use crate::listmerge::Tracker;

impl ListOpLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_agent_id(&mut self, name: &str) -> AgentId {
        self.cg.get_or_create_agent_id(name)
    }

    pub fn get_agent_name(&self, agent: AgentId) -> &str {
        self.cg.get_agent_name(agent)
    }

    /// Get the number of operations.
    pub fn len(&self) -> usize {
        self.cg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cg.is_empty()
    }

    /// The version of the whole oplog - the frontier of the operation DAG.
    pub fn local_version(&self) -> &[LV] {
        &self.cg.version
    }

    pub(crate) fn push_local_op(&mut self, agent: AgentId, op: ListOp) -> LV {
        let lv = self.cg.assign_local_op(agent);
        debug_assert_eq!(lv, self.ops.len());
        self.ops.push(op);
        lv
    }

    pub(crate) fn push_op_with_parents(&mut self, parents: &[LV], agent: AgentId, op: ListOp) -> LV {
        let lv = self.cg.assign_op_with_parents(parents, agent);
        debug_assert_eq!(lv, self.ops.len());
        self.ops.push(op);
        lv
    }

    /// Append a local insert of `content` at `pos`, one op per char. Returns
    /// the LV of the last op.
    pub fn add_insert(&mut self, agent: AgentId, pos: usize, content: &str) -> LV {
        let len = count_chars(content);
        assert!(len > 0, "Cannot add an empty insert");
        self.ops.reserve(len);
        self.cg.entries.reserve(len);

        let mut lv = 0;
        for (i, c) in content.chars().enumerate() {
            lv = self.push_local_op(agent, ListOp::new_insert(pos + i, c));
        }
        lv
    }

    /// Append a local delete of `range`. Each successive delete re-targets
    /// the same position, since the previous char has just disappeared.
    pub fn add_delete(&mut self, agent: AgentId, range: Range<usize>) -> LV {
        assert!(!range.is_empty(), "Cannot add an empty delete");

        let mut lv = 0;
        for _ in range.clone() {
            lv = self.push_local_op(agent, ListOp::new_delete(range.start));
        }
        lv
    }

    /// As [`ListOpLog::add_insert`], but grafted onto an explicit version
    /// rather than the current frontier. The first op lands at `parents`; the
    /// rest chain after it.
    pub fn add_insert_at(&mut self, parents: &[LV], agent: AgentId, pos: usize, content: &str) -> LV {
        let mut last: Option<LV> = None;
        for (i, c) in content.chars().enumerate() {
            let op = ListOp::new_insert(pos + i, c);
            let lv = match last {
                None => self.push_op_with_parents(parents, agent, op),
                Some(prev) => self.push_op_with_parents(&[prev], agent, op),
            };
            last = Some(lv);
        }
        last.expect("Cannot add an empty insert")
    }

    /// As [`ListOpLog::add_delete`], but grafted onto an explicit version.
    pub fn add_delete_at(&mut self, parents: &[LV], agent: AgentId, range: Range<usize>) -> LV {
        assert!(!range.is_empty(), "Cannot add an empty delete");

        let mut last: Option<LV> = None;
        for _ in range.clone() {
            let op = ListOp::new_delete(range.start);
            let lv = match last {
                None => self.push_op_with_parents(parents, agent, op),
                Some(prev) => self.push_op_with_parents(&[prev], agent, op),
            };
            last = Some(lv);
        }
        last.unwrap()
    }

    /// Materialise the document as it stood at `version`, by replaying the
    /// version's transitive history through a fresh tracker.
    pub fn checkout(&self, version: &[LV]) -> ListBranch {
        assert!(frontier_is_sorted(version));
        for &v in version {
            assert!(v < self.len(), "Version not in the oplog");
        }

        let mut branch = ListBranch::new();
        let mut tracker = Tracker::new();
        tracker.walk(self, version, Some(&mut branch.content));
        branch.version = version.into();
        branch
    }

    /// Materialise the current document.
    pub fn checkout_tip(&self) -> ListBranch {
        self.checkout(&self.cg.version)
    }

    pub fn dbg_check(&self) {
        self.cg.dbg_check();
        assert_eq!(self.ops.len(), self.cg.len());

        for op in &self.ops {
            match op.kind {
                ListOpKind::Ins => assert!(op.content.is_some()),
                ListOpKind::Del => assert!(op.content.is_none()),
            }
        }
    }
}
