//! The replay engine. This code materialises a document from the operation
//! DAG by walking the oplog in local order and keeping a list of every item
//! ever inserted (tombstones included), each tagged with its state *at the
//! tracker's current version*.
//!
//! Moving the current version around never edits the item list itself - it
//! just flips the per-item state counters (see [`item::ItemState`]). That's
//! what makes replaying a non-linear history cheap enough: to apply an op
//! created on some other branch we retreat the ops the branch hadn't seen,
//! advance the ones it had, and then integrate the new op as if we were the
//! originating peer.

use std::collections::HashMap;

use crate::{Frontier, LV};
use crate::listmerge::item::CrdtItem;

pub(crate) mod item;
pub(crate) mod merge;

#[derive(Debug, Default)]
pub(crate) struct Tracker {
    /// The total order of every item ever inserted, tombstones included.
    /// Items are found by scanning for their LV; positions in this list shift
    /// as concurrent items are integrated.
    items: Vec<CrdtItem>,

    /// For each delete operation (by LV), the item it turned out to target
    /// the first time it was applied. Retreating / advancing a delete needs
    /// this because the delete's stored position is only meaningful at its
    /// parent version.
    del_targets: HashMap<LV, LV>,

    /// The version the tracker is currently sitting at.
    cur_version: Frontier,
}
