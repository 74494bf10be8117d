use std::cmp::Ordering;

use jumprope::JumpRopeBuf;
use smallvec::smallvec;

use crate::LV;
use crate::causalgraph::CausalGraph;
use crate::list::ListOpLog;
use crate::list::operation::ListOpKind;
use crate::listmerge::Tracker;
use crate::listmerge::item::{CrdtItem, INSERTED, NOT_INSERTED_YET};

impl Tracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn find_item_idx(&self, lv: LV) -> usize {
        self.items.iter().position(|item| item.lv == lv)
            .expect("Item missing from tracker")
    }

    /// Scan from the left until we've counted `target_pos` items which are in
    /// the inserted state. Returns `(idx, end_pos)` where `end_pos` is the
    /// matching position in the materialised snapshot (which still contains
    /// items the current version hasn't inserted yet, but not tombstones).
    fn find_by_cur_pos(&self, target_pos: usize) -> (usize, usize) {
        let mut cur_pos = 0;
        let mut end_pos = 0;
        let mut idx = 0;

        while cur_pos < target_pos {
            let item = self.items.get(idx)
                .expect("Walked past the end of the item list");

            if item.state == INSERTED { cur_pos += 1; }
            if !item.ever_deleted { end_pos += 1; }
            idx += 1;
        }

        (idx, end_pos)
    }

    /// The item an op touches: itself for an insert, the recorded target for
    /// a delete. Deletes must have been applied before they can be stepped.
    fn op_target(&self, oplog: &ListOpLog, op_lv: LV) -> LV {
        match oplog.ops[op_lv].kind {
            ListOpKind::Ins => op_lv,
            ListOpKind::Del => *self.del_targets.get(&op_lv)
                .expect("Retreat / advance of a delete which was never applied"),
        }
    }

    /// Move the current version backwards over this op, without touching the
    /// item list itself.
    pub(crate) fn retreat_op(&mut self, oplog: &ListOpLog, op_lv: LV) {
        let target = self.op_target(oplog, op_lv);
        let idx = self.find_item_idx(target);
        match oplog.ops[op_lv].kind {
            ListOpKind::Ins => self.items[idx].state.mark_not_inserted_yet(),
            ListOpKind::Del => self.items[idx].state.undelete(),
        }
    }

    /// The inverse of [`Tracker::retreat_op`].
    pub(crate) fn advance_op(&mut self, oplog: &ListOpLog, op_lv: LV) {
        let target = self.op_target(oplog, op_lv);
        let idx = self.find_item_idx(target);
        match oplog.ops[op_lv].kind {
            ListOpKind::Ins => self.items[idx].state.mark_inserted(),
            ListOpKind::Del => self.items[idx].delete(),
        }
    }

    /// Should `new_item` sort before `other`, given both have identical
    /// origins? Ties are broken by agent name. Its possible for a user to
    /// conflict with themself if they commit to multiple branches - in that
    /// case, sort by seq number.
    fn ins_before(&self, cg: &CausalGraph, new_item: &CrdtItem, other: &CrdtItem) -> bool {
        let (new_agent, new_seq) = cg.lv_to_agent_version(new_item.lv);
        let (other_agent, other_seq) = cg.lv_to_agent_version(other.lv);

        match cg.get_agent_name(new_agent).cmp(cg.get_agent_name(other_agent)) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => new_seq < other_seq,
        }
    }

    /// Find where `new_item` lands amongst any concurrent items sitting
    /// between the preferred position and the item's right origin, then
    /// splice it in. Returns the snapshot position for the new content.
    ///
    /// This is the Yjs (YjsMod) integration rule. It only does real work when
    /// concurrent inserts landed at the same place in the document, which is
    /// rare in practice.
    fn integrate(&mut self, cg: &CausalGraph, new_item: CrdtItem, mut idx: usize, mut end_pos: usize) -> usize {
        let left = idx as isize - 1;
        let right = match new_item.origin_right {
            Some(lv) => self.find_item_idx(lv),
            None => self.items.len(),
        };

        let mut scan_idx = idx;
        let mut scan_end_pos = end_pos;
        let mut scanning = false;

        while scan_idx < right {
            let other = &self.items[scan_idx];

            // We can only be concurrent with items which haven't been
            // inserted yet at this point in time.
            if other.state != NOT_INSERTED_YET { break; }

            let other_left = other.origin_left
                .map(|lv| self.find_item_idx(lv) as isize)
                .unwrap_or(-1);
            let other_right = other.origin_right
                .map(|lv| self.find_item_idx(lv))
                .unwrap_or_else(|| self.items.len());

            if other_left < left {
                // The new item belongs before `other`.
                break;
            } else if other_left == left {
                if other_right == right {
                    // Identical origins - the order is decided by agent.
                    if self.ins_before(cg, &new_item, other) { break; }
                    scanning = false;
                } else {
                    // Provisionally after `other`, but a later item with our
                    // exact origins could still send us back to this spot.
                    scanning = other_right < right;
                }
            }
            // other_left > left: `other` hangs off a later left anchor and
            // we just step over it.

            if !other.ever_deleted { scan_end_pos += 1; }
            scan_idx += 1;

            if !scanning {
                idx = scan_idx;
                end_pos = scan_end_pos;
            }
        }

        self.items.insert(idx, new_item);
        end_pos
    }

    /// First (and only) real execution of an op. The tracker's current
    /// version must equal the op's parents when this is called.
    pub(crate) fn apply_op(&mut self, oplog: &ListOpLog, op_lv: LV, snapshot: Option<&mut JumpRopeBuf>) {
        let op = &oplog.ops[op_lv];

        match op.kind {
            ListOpKind::Ins => {
                let content = op.content.expect("Insert op with no content");

                // 1. Find the item directly before the requested position -
                //    our origin left.
                // 2. Scan forward for the next item which isn't in the not
                //    inserted yet state - our origin right.
                // 3. Integrate, since concurrent inserts may have landed here.
                let (idx, end_pos) = self.find_by_cur_pos(op.pos);

                if idx > 0 {
                    // Anything else means the op's stored position is garbage.
                    assert_eq!(self.items[idx - 1].state, INSERTED,
                               "Item to the left of an insert must be inserted");
                }
                let origin_left = if idx == 0 { None } else { Some(self.items[idx - 1].lv) };

                let origin_right = self.items[idx..].iter()
                    .find(|item| item.state != NOT_INSERTED_YET)
                    .map(|item| item.lv);

                let new_item = CrdtItem {
                    lv: op_lv,
                    origin_left,
                    origin_right,
                    state: INSERTED,
                    ever_deleted: false,
                };

                let end_pos = self.integrate(&oplog.cg, new_item, idx, end_pos);

                if let Some(rope) = snapshot {
                    let mut buf = [0u8; 4];
                    rope.insert(end_pos, content.encode_utf8(&mut buf));
                }
            }
            ListOpKind::Del => {
                let (mut idx, mut end_pos) = self.find_by_cur_pos(op.pos);

                // The walk may have stopped on items our version hasn't
                // inserted (or has deleted). The delete targets the next item
                // which is actually present.
                loop {
                    let item = self.items.get(idx)
                        .expect("Walked past the end looking for a delete target");
                    if item.state == INSERTED { break; }
                    if !item.ever_deleted { end_pos += 1; }
                    idx += 1;
                }

                if !self.items[idx].ever_deleted {
                    if let Some(rope) = snapshot {
                        rope.remove(end_pos..end_pos + 1);
                    }
                }

                let target_lv = self.items[idx].lv;
                self.items[idx].delete();
                self.del_targets.insert(op_lv, target_lv);
            }
        }
    }

    /// Replay every op in the transitive history of `target`, in oplog order,
    /// optionally materialising the resulting document into `snapshot`.
    ///
    /// For each op we reposition the current version at the op's parents
    /// (retreating newest-first, so a delete always rewinds before the insert
    /// it targets), then integrate the op itself.
    pub(crate) fn walk(&mut self, oplog: &ListOpLog, target: &[LV], mut snapshot: Option<&mut JumpRopeBuf>) {
        for op_lv in oplog.cg.version_closure(target) {
            let (only_a, only_b) = oplog.cg.diff(&self.cur_version, oplog.cg.parents_at(op_lv));

            // `diff` returns both sets in descending order.
            for &retreat_lv in only_a.iter() {
                self.retreat_op(oplog, retreat_lv);
            }
            for &advance_lv in only_b.iter().rev() {
                self.advance_op(oplog, advance_lv);
            }

            self.apply_op(oplog, op_lv, snapshot.as_deref_mut());
            self.cur_version = smallvec![op_lv];
        }
    }
}

#[cfg(test)]
mod tests {
    use jumprope::JumpRopeBuf;
    use crate::list::ListOpLog;
    use crate::listmerge::Tracker;

    fn replay(oplog: &ListOpLog) -> String {
        let mut content = JumpRopeBuf::new();
        let mut tracker = Tracker::new();
        tracker.walk(oplog, &oplog.cg.version.clone(), Some(&mut content));
        content.to_string()
    }

    #[test]
    fn linear_history() {
        let mut oplog = ListOpLog::new();
        let a = oplog.get_or_create_agent_id("a");
        oplog.add_insert(a, 0, "hi");
        oplog.add_insert(a, 2, "!");
        assert_eq!(replay(&oplog), "hi!");

        oplog.add_delete(a, 0..1);
        assert_eq!(replay(&oplog), "i!");
    }

    #[test]
    fn concurrent_inserts_at_root() {
        let mut oplog = ListOpLog::new();
        let a = oplog.get_or_create_agent_id("a");
        let b = oplog.get_or_create_agent_id("b");

        oplog.add_insert_at(&[], a, 0, "hi");
        oplog.add_insert_at(&[], b, 0, "yo");

        // Both replicas put a's insert first because "a" < "b".
        assert_eq!(replay(&oplog), "hiyo");
    }

    #[test]
    fn concurrent_insert_order_is_agent_order() {
        for (first, second, expect) in [("a", "b", "AB"), ("z", "b", "BA")] {
            let mut oplog = ListOpLog::new();
            let x = oplog.get_or_create_agent_id(first);
            let y = oplog.get_or_create_agent_id(second);
            oplog.add_insert_at(&[], x, 0, "A");
            oplog.add_insert_at(&[], y, 0, "B");
            assert_eq!(replay(&oplog), expect);
        }
    }

    #[test]
    fn delete_with_concurrent_insert_in_the_hole() {
        let mut oplog = ListOpLog::new();
        let a = oplog.get_or_create_agent_id("a");
        let b = oplog.get_or_create_agent_id("b");

        let base = oplog.add_insert(a, 0, "abc"); // 0 1 2
        oplog.add_delete_at(&[base], a, 1..2);    // deletes 'b'
        oplog.add_insert_at(&[base], b, 2, "X");  // between 'b' and 'c'

        assert_eq!(replay(&oplog), "aXc");
    }

    #[test]
    fn concurrent_deletes_of_the_same_item() {
        let mut oplog = ListOpLog::new();
        let a = oplog.get_or_create_agent_id("a");
        let b = oplog.get_or_create_agent_id("b");

        let base = oplog.add_insert(a, 0, "abc");
        oplog.add_delete_at(&[base], a, 1..2);
        oplog.add_delete_at(&[base], b, 1..2);

        assert_eq!(replay(&oplog), "ac");
    }

    #[test]
    fn checkout_at_an_old_version() {
        let mut oplog = ListOpLog::new();
        let a = oplog.get_or_create_agent_id("a");
        let v1 = oplog.add_insert(a, 0, "hi");
        let v2 = oplog.add_insert(a, 2, " there");
        oplog.add_delete(a, 0..2);

        assert_eq!(oplog.checkout(&[v1]).content().to_string(), "hi");
        assert_eq!(oplog.checkout(&[v2]).content().to_string(), "hi there");
        assert_eq!(oplog.checkout_tip().content().to_string(), " there");
        assert_eq!(oplog.checkout(&[]).content().to_string(), "");
    }

    #[test]
    fn order_of_application_doesnt_matter() {
        // The same DAG loaded in two different topological orders produces
        // the same text.
        let build = |flip: bool| {
            let mut oplog = ListOpLog::new();
            let a = oplog.get_or_create_agent_id("a");
            let b = oplog.get_or_create_agent_id("b");
            if flip {
                oplog.add_insert_at(&[], b, 0, "yo");
                oplog.add_insert_at(&[], a, 0, "hi");
            } else {
                oplog.add_insert_at(&[], a, 0, "hi");
                oplog.add_insert_at(&[], b, 0, "yo");
            }
            replay(&oplog)
        };

        assert_eq!(build(false), "hiyo");
        assert_eq!(build(true), "hiyo");
    }
}
