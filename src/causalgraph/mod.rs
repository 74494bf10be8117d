//! The causal graph stores the metadata half of the oplog: which agent
//! produced each operation (and at what sequence number), and each operation's
//! parents in the DAG. Operation *contents* live next door in
//! [`ListOpLog`](crate::list::ListOpLog).

use smartstring::alias::String as SmartString;

use crate::{AgentId, Frontier, LV};
use crate::frontier::{advance_frontier, frontier_is_sorted, local_frontier_eq};

pub mod remote_ids;
pub mod tools;

/// The interned form of an operation id: `(agent, seq)`.
pub type AgentVersion = (AgentId, usize);

#[derive(Clone, Debug)]
pub(crate) struct ClientData {
    /// Used to map from the client's name to its numerical ID.
    pub(crate) name: SmartString,

    /// Every op this client has produced, indexed by sequence number. Seqs are
    /// issued densely from 0, so this doubles as the (agent, seq) -> LV index
    /// and as the per-agent high water mark (`lv_by_seq.len()`).
    pub(crate) lv_by_seq: Vec<LV>,
}

impl ClientData {
    pub fn get_next_seq(&self) -> usize {
        self.lv_by_seq.len()
    }

    #[inline]
    pub(crate) fn try_seq_to_lv(&self, seq: usize) -> Option<LV> {
        self.lv_by_seq.get(seq).copied()
    }

    pub(crate) fn seq_to_lv(&self, seq: usize) -> LV {
        self.try_seq_to_lv(seq).unwrap()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CGEntry {
    /// The version of the originating peer immediately before this op was
    /// created. Sorted ascending; empty when the op was made against the root
    /// (empty) document.
    pub parents: Frontier,
    pub agent: AgentId,
    pub seq: usize,
}

#[derive(Clone, Debug, Default)]
pub struct CausalGraph {
    /// For each client we store its name and its seq -> LV table. Indexed by
    /// AgentId.
    pub(crate) client_data: Vec<ClientData>,

    /// Parents and agent assignment for each operation, indexed by LV.
    pub(crate) entries: Vec<CGEntry>,

    /// The current frontier: the set of operations in the graph with no
    /// children yet.
    pub version: Frontier,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of operations in the graph.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get_agent_id(&self, name: &str) -> Option<AgentId> {
        self.client_data.iter()
            .position(|client_data| client_data.name == name)
            .map(|id| id as AgentId)
    }

    pub fn get_or_create_agent_id(&mut self, name: &str) -> AgentId {
        if let Some(id) = self.get_agent_id(name) {
            id
        } else {
            // Create a new id.
            self.client_data.push(ClientData {
                name: SmartString::from(name),
                lv_by_seq: Vec::new(),
            });
            (self.client_data.len() - 1) as AgentId
        }
    }

    pub fn get_agent_name(&self, agent: AgentId) -> &str {
        self.client_data[agent as usize].name.as_str()
    }

    pub fn num_agents(&self) -> usize {
        self.client_data.len()
    }

    pub(crate) fn parents_at(&self, lv: LV) -> &[LV] {
        &self.entries[lv].parents
    }

    pub(crate) fn lv_to_agent_version(&self, lv: LV) -> AgentVersion {
        let e = &self.entries[lv];
        (e.agent, e.seq)
    }

    #[allow(unused)]
    pub(crate) fn try_agent_version_to_lv(&self, (agent, seq): AgentVersion) -> Option<LV> {
        self.client_data.get(agent as usize)
            .and_then(|c| c.try_seq_to_lv(seq))
    }

    /// Add an operation to the graph with the named parents, assigning it the
    /// agent's next sequence number. Returns the new op's LV.
    pub(crate) fn assign_op_with_parents(&mut self, parents: &[LV], agent: AgentId) -> LV {
        assert!(frontier_is_sorted(parents), "parents list must be sorted");

        let lv = self.entries.len();
        for &p in parents {
            // Acyclicity: all edges point strictly backwards in time.
            assert!(p < lv, "parent must precede the op");
        }

        let client_data = &mut self.client_data[agent as usize];
        let seq = client_data.get_next_seq();
        client_data.lv_by_seq.push(lv);

        self.entries.push(CGEntry {
            parents: parents.into(),
            agent,
            seq,
        });
        advance_frontier(&mut self.version, lv, parents);
        lv
    }

    /// Add a locally authored operation: its parents are whatever the current
    /// frontier is.
    pub(crate) fn assign_local_op(&mut self, agent: AgentId) -> LV {
        let parents = self.version.clone();
        self.assign_op_with_parents(&parents, agent)
    }

    pub fn dbg_check(&self) {
        assert!(frontier_is_sorted(&self.version));

        let mut has_child = vec![false; self.len()];
        for (lv, e) in self.entries.iter().enumerate() {
            assert!(frontier_is_sorted(&e.parents));
            for &p in e.parents.iter() {
                assert!(p < lv);
                has_child[p] = true;
            }
            // The agent assignment tables must round trip.
            assert_eq!(self.client_data[e.agent as usize].lv_by_seq[e.seq], lv);
        }

        // The frontier is exactly the set of operations with no children.
        let expected: Frontier = has_child.iter().enumerate()
            .filter_map(|(lv, &c)| (!c).then_some(lv))
            .collect();
        assert!(local_frontier_eq(&expected, &self.version));

        for (agent, client) in self.client_data.iter().enumerate() {
            for (seq, &lv) in client.lv_by_seq.iter().enumerate() {
                assert_eq!(self.entries[lv].agent as usize, agent);
                assert_eq!(self.entries[lv].seq, seq);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_interning() {
        let mut cg = CausalGraph::new();
        let seph = cg.get_or_create_agent_id("seph");
        let mike = cg.get_or_create_agent_id("mike");
        assert_ne!(seph, mike);
        assert_eq!(cg.get_or_create_agent_id("seph"), seph);
        assert_eq!(cg.get_agent_name(mike), "mike");
        assert_eq!(cg.num_agents(), 2);
    }

    #[test]
    fn assign_advances_the_frontier() {
        let mut cg = CausalGraph::new();
        let a = cg.get_or_create_agent_id("a");
        let b = cg.get_or_create_agent_id("b");

        let v0 = cg.assign_local_op(a);
        let v1 = cg.assign_local_op(a);
        assert_eq!((v0, v1), (0, 1));
        assert_eq!(cg.version.as_slice(), &[1]);

        // An op concurrent with everything so far.
        let v2 = cg.assign_op_with_parents(&[], b);
        assert_eq!(cg.version.as_slice(), &[1, 2]);
        assert_eq!(cg.lv_to_agent_version(v2), (b, 0));

        cg.assign_op_with_parents(&[1, 2], a);
        assert_eq!(cg.version.as_slice(), &[3]);
        cg.dbg_check();
    }

    #[test]
    #[should_panic]
    fn parents_must_precede() {
        let mut cg = CausalGraph::new();
        let a = cg.get_or_create_agent_id("a");
        cg.assign_op_with_parents(&[0], a);
    }
}
