//! In-memory rope-backed buffer with transactional undo

use ropey::Rope;

use super::history::{EditHistory, UndoEntry};
use super::BufferAccess;
use crate::model::{EditBatch, EditError, TextSnapshot};

/// Label for edits applied outside any transaction
const LOOSE_EDIT_LABEL: &str = "Edit";

/// Open transaction state
#[derive(Debug, Clone)]
struct PendingTransaction {
    label: String,
    depth: usize,
    before: Rope,
    edit_count: usize,
}

/// A text buffer held in memory.
///
/// Every successful [`apply`](BufferAccess::apply) produces a new snapshot
/// version. Edits applied inside a transaction form one undo entry when the
/// transaction completes; edits applied outside one are recorded individually.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    current: TextSnapshot,
    history: EditHistory,
    pending: Option<PendingTransaction>,
}

impl MemoryBuffer {
    pub fn new(text: &str) -> Self {
        Self::from_snapshot(TextSnapshot::new(text))
    }

    pub fn from_snapshot(snapshot: TextSnapshot) -> Self {
        Self {
            current: snapshot,
            history: EditHistory::new(),
            pending: None,
        }
    }

    /// Full buffer text
    pub fn text(&self) -> String {
        self.current.to_string()
    }

    pub fn version(&self) -> u64 {
        self.current.version()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    /// Revert the most recent undo entry. Returns false when there is none or
    /// a transaction is open.
    pub fn undo(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        match self.history.pop_undo() {
            Some(entry) => {
                self.replace_text(entry.before);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone entry
    pub fn redo(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        match self.history.pop_redo() {
            Some(entry) => {
                self.replace_text(entry.before);
                true
            }
            None => false,
        }
    }

    /// Swap in new text as the next version
    fn replace_text(&mut self, rope: Rope) {
        let version = self.current.version().wrapping_add(1);
        self.current = TextSnapshot::from_rope(rope, version);
    }
}

impl BufferAccess for MemoryBuffer {
    fn snapshot(&self) -> TextSnapshot {
        self.current.clone()
    }

    fn apply(&mut self, batch: &EditBatch) -> Result<TextSnapshot, EditError> {
        let next = self.current.apply(batch)?;
        let before = std::mem::replace(&mut self.current, next.clone());

        match self.pending.as_mut() {
            Some(pending) => pending.edit_count += batch.len(),
            None if !batch.is_empty() => self.history.push(UndoEntry::new(
                LOOSE_EDIT_LABEL,
                before.rope().clone(),
                next.rope().clone(),
                batch.len(),
            )),
            None => {}
        }

        Ok(next)
    }

    fn begin_transaction(&mut self, label: &str) {
        match self.pending.as_mut() {
            Some(pending) => pending.depth += 1,
            None => {
                self.pending = Some(PendingTransaction {
                    label: label.to_string(),
                    depth: 1,
                    before: self.current.rope().clone(),
                    edit_count: 0,
                });
            }
        }
    }

    fn complete_transaction(&mut self) -> bool {
        let Some(mut pending) = self.pending.take() else {
            tracing::warn!("complete_transaction called with no open transaction");
            return false;
        };

        pending.depth -= 1;
        if pending.depth > 0 {
            self.pending = Some(pending);
            return false;
        }

        if pending.edit_count == 0 {
            return false;
        }

        self.history.push(UndoEntry::new(
            pending.label,
            pending.before,
            self.current.rope().clone(),
            pending.edit_count,
        ));
        true
    }

    fn discard_transaction(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            tracing::warn!("discard_transaction called with no open transaction");
            return;
        };

        pending.depth -= 1;
        if pending.depth > 0 {
            // Only the outermost scope rolls back
            self.pending = Some(pending);
            return;
        }

        if pending.edit_count > 0 {
            tracing::debug!(
                "Rolling back {} edits of '{}'",
                pending.edit_count,
                pending.label
            );
            self.replace_text(pending.before);
        }
    }
}
