//! This module contains all the code to handle list CRDTs - the oplog, the
//! branch (a document checkout) and the [`ListCRDT`] document façade which
//! most hosts will use.
//!
//! Documents are lists of unicode characters (text). Positions throughout are
//! denominated in chars.

use jumprope::JumpRopeBuf;

use crate::{AgentId, Frontier};
use crate::causalgraph::CausalGraph;
use crate::list::operation::ListOp;

pub mod operation;

mod branch;
mod check;
mod doc;
mod external_ops;
mod oplog;

#[cfg(feature = "dot_export")]
mod dot;

pub use external_ops::{MergeError, RemoteListOp};

/// The oplog is an append-only store of every operation ever made to a
/// document: each op's content (here) plus its id and parents (in the owned
/// [`CausalGraph`]). Ops are indexed by LV.
#[derive(Debug, Clone, Default)]
pub struct ListOpLog {
    pub(crate) cg: CausalGraph,
    pub(crate) ops: Vec<ListOp>,
}

/// A branch stores a checkout / snapshot of a document at some version.
///
/// Internally a branch is just two fields:
///
/// - The content (the document text, tombstones excluded)
/// - The version the content corresponds to
///
/// Whenever the content changes, the version changes with it. At the root
/// (empty) version a branch is always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBranch {
    /// The version the branch is at. This is used to track which changes the
    /// branch has or has not locally merged.
    version: Frontier,

    /// The document's content.
    content: JumpRopeBuf,
}

/// A simple bundled document: an oplog, a cached branch at the oplog's
/// frontier, and the agent all local edits are authored as.
#[derive(Debug)]
pub struct ListCRDT {
    pub oplog: ListOpLog,
    pub branch: ListBranch,
    agent: AgentId,
}
