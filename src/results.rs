//! Ordered Result Accumulation
//!
//! Workers finish in whatever order they finish; the slot table is what
//! turns that back into input order. Each worker writes its outcome at its
//! original index, and the table is read once, after every writer is done.

use thiserror::Error;
use tokio::sync::Mutex;

/// Write past the end of the table. Enumeration hands every worker an index
/// below the table length, so hitting this is an internal bug, not a
/// recoverable condition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("slot index {index} out of bounds for table of length {len}")]
pub struct OutOfBounds {
    pub index: usize,
    pub len: usize,
}

enum Slot<T> {
    Unwritten,
    Written(Option<T>),
}

/// Fixed-length store of per-index outcomes, shared by the workers of one
/// run and consumed when that run returns.
///
/// The mutex covers each write; "each index written at most once" is the
/// scheduler's enumeration discipline, checked here only in debug builds.
pub struct SlotTable<T> {
    slots: Mutex<Vec<Slot<T>>>,
}

impl<T> SlotTable<T> {
    /// A table of `len` unwritten slots.
    pub fn new(len: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(len, || Slot::Unwritten);
        Self {
            slots: Mutex::new(slots),
        }
    }

    /// Record the outcome for `index`: a value, or `None` for an item the
    /// transform dropped.
    pub async fn set(&self, index: usize, value: Option<T>) -> std::result::Result<(), OutOfBounds> {
        let mut slots = self.slots.lock().await;
        let len = slots.len();
        let slot = slots.get_mut(index).ok_or(OutOfBounds { index, len })?;
        debug_assert!(
            matches!(slot, Slot::Unwritten),
            "slot {index} written twice"
        );
        *slot = Slot::Written(value);
        Ok(())
    }

    /// Every slot in index order; unwritten slots read as `None`.
    pub fn into_values(self) -> Vec<Option<T>> {
        self.slots
            .into_inner()
            .into_iter()
            .map(|slot| match slot {
                Slot::Written(value) => value,
                Slot::Unwritten => None,
            })
            .collect()
    }

    /// Present values only, still in index order.
    pub fn into_present(self) -> Vec<T> {
        self.into_values().into_iter().flatten().collect()
    }
}
