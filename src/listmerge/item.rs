use crate::LV;

/// 0 = not inserted yet,
/// 1 = inserted but not deleted
/// 2+ = deleted n-1 times.
///
/// Deletes stack so the same item can be deleted along multiple DAG paths and
/// un-deleted one retreat at a time. Double deletes almost never happen in
/// reality - unless someone is maliciously generating them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) struct ItemState(u32);

pub(crate) const NOT_INSERTED_YET: ItemState = ItemState(0);
pub(crate) const INSERTED: ItemState = ItemState(1);
pub(crate) const DELETED_ONCE: ItemState = ItemState(2);

impl ItemState {
    /// Note this doesn't (can't) set the ever_deleted flag. Use
    /// [`CrdtItem::delete`] instead.
    fn delete(&mut self) {
        if *self == NOT_INSERTED_YET {
            panic!("Cannot delete NIY item");
        } else {
            // Insert -> delete, delete -> double delete, etc. To overflow this
            // counter something needs to generate 4 billion deletes of one
            // item, which should never happen except maliciously.
            self.0 = self.0.checked_add(1)
                .expect("Double delete overflow detected. Refusing to merge.");
        }
    }

    pub(crate) fn undelete(&mut self) {
        if *self >= DELETED_ONCE {
            // Double delete -> single delete, deleted -> inserted.
            self.0 -= 1;
        } else {
            panic!("Invalid undelete target");
        }
    }

    pub(crate) fn mark_inserted(&mut self) {
        if *self != NOT_INSERTED_YET {
            panic!("Invalid insert target - item already marked as inserted");
        }

        *self = INSERTED;
    }

    pub(crate) fn mark_not_inserted_yet(&mut self) {
        if *self != INSERTED {
            panic!("Invalid insert target - item not inserted");
        }

        *self = NOT_INSERTED_YET;
    }
}

/// One entry in the tracker's total order - a single inserted character,
/// which sticks around as a tombstone after its been deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct CrdtItem {
    /// The LV of the insert which created this item.
    pub lv: LV,

    /// The item which was immediately to our left when this item was created,
    /// or None for an insert at the start of the document.
    pub origin_left: Option<LV>,

    /// The next item to our right (at creation time) which had already been
    /// inserted, or None for an insert at the end of the document.
    pub origin_right: Option<LV>,

    /// Whether the item has been inserted, inserted then deleted, or not
    /// inserted yet at the tracker's current moment in time.
    pub state: ItemState,

    /// Set the first time any delete touches this item, and never cleared.
    /// Governs visibility in the materialised snapshot.
    pub ever_deleted: bool,
}

impl CrdtItem {
    pub(crate) fn delete(&mut self) {
        self.state.delete();
        self.ever_deleted = true;
    }
}
