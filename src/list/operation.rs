//! The tagged operation payload. An operation inserts or deletes exactly one
//! character; the id / parents half of each op lives in the causal graph.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListOpKind {
    Ins,
    Del,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListOp {
    pub kind: ListOpKind,

    /// The position of the edit in the document *as the originating peer saw
    /// it*, ie at the op's parent version. In chars.
    pub pos: usize,

    /// The inserted character. Always set for inserts, never for deletes.
    pub content: Option<char>,
}

impl ListOp {
    pub fn new_insert(pos: usize, content: char) -> Self {
        ListOp { kind: ListOpKind::Ins, pos, content: Some(content) }
    }

    pub fn new_delete(pos: usize) -> Self {
        ListOp { kind: ListOpKind::Del, pos, content: None }
    }
}
