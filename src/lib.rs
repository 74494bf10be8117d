//! An event-graph walking text CRDT.
//!
//! The oplog stores every insert / delete ever made to a document, as a DAG of
//! operations partially ordered by their parent versions. Merging is done by
//! replaying the operation graph: a tracker walks the log in local order,
//! rewinding (retreating) and replaying (advancing) operations so each op is
//! integrated at the version at which it was originally created. Concurrent
//! inserts are ordered with the Yjs origin-left / origin-right rule, which
//! makes the result identical on every replica regardless of delivery order.

use smallvec::SmallVec;

pub mod causalgraph;
pub mod list;
mod frontier;
mod listmerge;

/// A local version (also sometimes called a local time) is the index of an
/// operation in the oplog which owns it. LVs are not portable between peers -
/// use [`RemoteVersion`](causalgraph::remote_ids::RemoteVersion) for that.
pub type LV = usize;

/// An integer naming an agent in the local causal graph's client table. Like
/// LVs, agent ids are local; the portable identity is the agent's name string.
pub type AgentId = u32;

/// A frontier names a version of the document: the set of operations with no
/// observed children. Frontiers are always sorted in ascending order and
/// contain no redundant (dominated) entries. The root version is the empty
/// frontier.
pub type Frontier = SmallVec<[LV; 2]>;

pub use causalgraph::CausalGraph;
pub use causalgraph::remote_ids::{RemoteVersion, RemoteVersionOwned, VersionConversionError};
pub use frontier::local_frontier_eq;
pub use list::{ListBranch, ListCRDT, ListOpLog, MergeError, RemoteListOp};
