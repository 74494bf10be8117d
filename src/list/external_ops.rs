//! The wire form of operations, for shipping between peers. Everything here
//! is keyed by `(agent name, seq)` ids - LVs never leave the replica which
//! assigned them. The actual byte format is whatever the host's serde format
//! of choice makes of these types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Frontier, LV};
use crate::causalgraph::remote_ids::{RemoteFrontierOwned, RemoteVersionOwned, VersionConversionError};
use crate::frontier::sort_frontier;
use crate::list::ListOpLog;
use crate::list::operation::{ListOp, ListOpKind};

/// A single operation as sent to (or received from) a remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemoteListOp {
    pub id: RemoteVersionOwned,

    /// The op's parents. A peer can only apply this op once it has every op
    /// named here - send logs in their natural order and this holds for free.
    pub parents: RemoteFrontierOwned,

    pub kind: ListOpKind,
    pub pos: usize,
    pub content: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeError {
    /// A parent id names an op this oplog hasn't seen. The sender must
    /// deliver causally.
    UnknownParent(VersionConversionError),

    /// The op skipped ahead of the next seq we expect from its agent. The
    /// sender must deliver each agent's ops in seq order.
    SeqGap,
}

impl From<VersionConversionError> for MergeError {
    fn from(err: VersionConversionError) -> Self {
        MergeError::UnknownParent(err)
    }
}

impl ListOpLog {
    pub(crate) fn remote_op_at(&self, lv: LV) -> RemoteListOp {
        let op = &self.ops[lv];
        RemoteListOp {
            id: self.cg.local_to_remote_version(lv).to_owned(),
            parents: self.cg.parents_at(lv).iter()
                .map(|&p| self.cg.local_to_remote_version(p).to_owned())
                .collect(),
            kind: op.kind,
            pos: op.pos,
            content: op.content,
        }
    }

    /// Every op in the log in local order, ready for transport. Local order
    /// is causally sound: parents always appear before their children.
    pub fn iter_remote_ops(&self) -> impl Iterator<Item = RemoteListOp> + '_ {
        (0..self.len()).map(|lv| self.remote_op_at(lv))
    }

    /// Apply one op from a remote peer.
    ///
    /// Returns `Ok(None)` if we already had the op (duplicates are silently
    /// absorbed). On any error the oplog is left completely untouched.
    pub fn apply_remote_op(&mut self, op: &RemoteListOp) -> Result<Option<LV>, MergeError> {
        // Translate the parents first; nothing is mutated until every check
        // has passed.
        let mut parents: Frontier = op.parents.iter()
            .map(|rv| self.cg.try_remote_to_local_version(rv.into()))
            .collect::<Result<Frontier, VersionConversionError>>()?;
        sort_frontier(&mut parents);

        let RemoteVersionOwned(agent_name, seq) = &op.id;
        let next_seq = self.cg.get_agent_id(agent_name)
            .map_or(0, |agent| self.cg.client_data[agent as usize].get_next_seq());

        if *seq < next_seq {
            // We've already seen this op.
            return Ok(None);
        } else if *seq > next_seq {
            return Err(MergeError::SeqGap);
        }

        debug_assert_eq!(op.content.is_some(), op.kind == ListOpKind::Ins);

        let agent = self.cg.get_or_create_agent_id(agent_name);
        let lv = self.cg.assign_op_with_parents(&parents, agent);
        self.ops.push(ListOp {
            kind: op.kind,
            pos: op.pos,
            content: op.content,
        });
        Ok(Some(lv))
    }

    /// Absorb every op in `other` which we don't have yet. Returns the number
    /// of ops actually applied.
    ///
    /// Iterating `other` in its log order guarantees causal readiness, so
    /// this cannot fail on a well-formed peer oplog.
    pub fn merge_ops(&mut self, other: &Self) -> Result<usize, MergeError> {
        let mut applied = 0;
        for lv in 0..other.len() {
            if self.apply_remote_op(&other.remote_op_at(lv))?.is_some() {
                applied += 1;
            }
        }
        Ok(applied)
    }
}
