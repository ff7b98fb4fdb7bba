use std::collections::VecDeque;

use crate::types::KeyValue;

/// Default number of changes kept per document.
pub const DEFAULT_CAPACITY: usize = 100;

/// One undoable edit. Holds value copies, never references into a document,
/// so history survives later edits or removal of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// `entry` was appended at `index`.
    Add { entry: KeyValue, index: usize },
    /// The first entry with `entry.key` went from `old_value` to `entry.value`.
    Update { entry: KeyValue, old_value: String },
    /// `entry` was removed from `index`.
    Delete { entry: KeyValue, index: usize },
}

impl Change {
    pub fn entry(&self) -> &KeyValue {
        match self {
            Change::Add { entry, .. }
            | Change::Update { entry, .. }
            | Change::Delete { entry, .. } => entry,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Change::Add { entry, .. } => format!("add {}", entry.key),
            Change::Update { entry, .. } => format!("update {}", entry.key),
            Change::Delete { entry, .. } => format!("delete {}", entry.key),
        }
    }
}

/// Bounded linear undo/redo history.
///
/// Tracks what happened and where the cursor is; applying or reverting a
/// change against a document is the caller's job.
#[derive(Debug, Clone)]
pub struct ChangeStack {
    changes: VecDeque<Change>,
    /// Number of changes currently applied; `changes[applied - 1]` is the
    /// most recent one.
    applied: usize,
    capacity: usize,
}

impl Default for ChangeStack {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            changes: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            applied: 0,
            capacity,
        }
    }

    /// Record a change. Drops the redo tail and, past capacity, the oldest change.
    pub fn push(&mut self, change: Change) {
        self.changes.truncate(self.applied);
        self.changes.push_back(change);
        self.applied += 1;

        if self.changes.len() > self.capacity {
            self.changes.pop_front();
            self.applied -= 1;
        }
    }

    /// Step back one change and return it, or `None` when nothing is applied.
    pub fn undo(&mut self) -> Option<&Change> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.changes.get(self.applied)
    }

    /// Step forward one change and return it, or `None` at the head.
    pub fn redo(&mut self) -> Option<&Change> {
        if self.applied == self.changes.len() {
            return None;
        }
        self.applied += 1;
        self.changes.get(self.applied - 1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.changes.len()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
        self.applied = 0;
    }

    /// Index of the most recently applied change, `None` when nothing is applied.
    pub fn position(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
