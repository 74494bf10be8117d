use crate::list::{ListBranch, ListCRDT, ListOpLog};

impl ListCRDT {
    /// An empty document whose local edits will be authored by `agent_name`.
    pub fn new(agent_name: &str) -> Self {
        let mut oplog = ListOpLog::new();
        let agent = oplog.get_or_create_agent_id(agent_name);
        Self {
            oplog,
            branch: ListBranch::new(),
            agent,
        }
    }

    /// The document's length, in chars.
    pub fn len(&self) -> usize {
        self.branch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branch.is_empty()
    }

    /// The current document text.
    pub fn text(&self) -> String {
        self.branch.content.to_string()
    }

    pub fn insert(&mut self, pos: usize, content: &str) {
        if content.is_empty() { return; }
        self.branch.insert(&mut self.oplog, self.agent, pos, content);
    }

    pub fn delete(&mut self, pos: usize, len: usize) {
        if len == 0 { return; }
        self.branch.delete(&mut self.oplog, self.agent, pos, len);
    }

    /// Absorb everything `other` knows that we don't, then rebuild the
    /// snapshot by replay. Afterwards our text includes both documents'
    /// edits; merging the other way as well makes the texts identical.
    pub fn merge_from(&mut self, other: &Self) {
        self.oplog.merge_ops(&other.oplog)
            .expect("A well-formed peer oplog merges cleanly");
        self.branch.merge(&self.oplog, &self.oplog.cg.version);
    }
}

#[cfg(test)]
mod tests {
    use crate::list::ListCRDT;

    #[test]
    fn solo_author() {
        let mut d = ListCRDT::new("s");
        d.insert(0, "hi");
        d.insert(2, "!");
        assert_eq!(d.text(), "hi!");
        d.dbg_check(true);
    }

    #[test]
    fn concurrent_prepend() {
        let mut a = ListCRDT::new("a");
        let mut b = ListCRDT::new("b");
        a.insert(0, "hi");
        b.insert(0, "yo");

        a.merge_from(&b);
        b.merge_from(&a);

        // "a" wins the tie for the left position.
        assert_eq!(a.text(), "hiyo");
        assert_eq!(b.text(), "hiyo");
        a.dbg_check(true);
        b.dbg_check(true);
    }

    #[test]
    fn insert_after_merge() {
        let mut a = ListCRDT::new("a");
        let mut b = ListCRDT::new("b");
        a.insert(0, "hi");
        b.insert(0, "yo");
        a.merge_from(&b);
        b.merge_from(&a);

        b.insert(4, "x");
        assert_eq!(b.text(), "hiyox");

        a.merge_from(&b);
        b.merge_from(&a);
        assert_eq!(a.text(), "hiyox");
        assert_eq!(b.text(), "hiyox");
    }

    #[test]
    fn delete_with_concurrent_insert_in_the_hole() {
        let mut a = ListCRDT::new("a");
        a.insert(0, "abc");
        let mut b = ListCRDT::new("b");
        b.merge_from(&a);

        a.delete(1, 1);     // Deletes 'b'.
        b.insert(2, "X");   // Concurrently lands between 'b' and 'c'.

        a.merge_from(&b);
        b.merge_from(&a);
        assert_eq!(a.text(), "aXc");
        assert_eq!(b.text(), "aXc");
        a.dbg_check(true);
        b.dbg_check(true);
    }

    #[test]
    fn interleaved_authors_at_identical_origin() {
        let mut a = ListCRDT::new("a");
        let mut b = ListCRDT::new("b");
        a.insert(0, "A");
        b.insert(0, "B");
        a.merge_from(&b);
        b.merge_from(&a);
        assert_eq!(a.text(), "AB");
        assert_eq!(b.text(), "AB");
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = ListCRDT::new("a");
        a.insert(0, "abc");
        let mut b = ListCRDT::new("b");
        b.merge_from(&a);
        a.delete(1, 1);
        b.insert(2, "X");
        a.merge_from(&b);
        b.merge_from(&a);

        let before = a.text();
        a.merge_from(&b);
        assert_eq!(a.text(), before);
        a.dbg_check(true);
    }

    #[test]
    fn empty_edits_are_ignored() {
        let mut d = ListCRDT::new("s");
        d.insert(0, "");
        d.delete(0, 0);
        assert!(d.is_empty());
        assert!(d.oplog.is_empty());
    }

    #[test]
    fn unicode_content() {
        let mut a = ListCRDT::new("a");
        a.insert(0, "héllo");
        a.delete(1, 1);
        assert_eq!(a.text(), "hllo");

        let mut b = ListCRDT::new("b");
        b.merge_from(&a);
        b.insert(4, "🙂");
        assert_eq!(b.text(), "hllo🙂");

        a.merge_from(&b);
        assert_eq!(a.text(), b.text());
        a.dbg_check(true);
    }
}
