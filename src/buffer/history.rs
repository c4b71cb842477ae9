//! Undo/redo history for committed transactions.

use ropey::Rope;

/// One undoable unit: the buffer text before and after a committed transaction.
///
/// Ropes share structure, so keeping both sides is cheap.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// Transaction label shown by the host (e.g. "Format on save")
    pub label: String,
    /// Text before the transaction
    pub before: Rope,
    /// Text after the transaction
    pub after: Rope,
    /// Number of edit operations the transaction applied
    pub edit_count: usize,
}

impl UndoEntry {
    pub fn new(label: impl Into<String>, before: Rope, after: Rope, edit_count: usize) -> Self {
        Self {
            label: label.into(),
            before,
            after,
            edit_count,
        }
    }

    /// Get the inverse entry for undo
    pub fn inverse(&self) -> Self {
        Self {
            label: self.label.clone(),
            before: self.after.clone(),
            after: self.before.clone(),
            edit_count: self.edit_count,
        }
    }
}

/// Edit history with undo/redo stacks.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    max_size: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    /// Create a new edit history with default max size
    pub fn new() -> Self {
        Self::with_max_size(100)
    }

    /// Create a new edit history with specified max size
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Push an entry onto the undo stack (clears redo stack)
    pub fn push(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        // Trim if exceeded max size
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Pop an entry from the undo stack (moves its inverse to the redo stack)
    pub fn pop_undo(&mut self) -> Option<UndoEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.inverse());
        Some(entry)
    }

    /// Pop an entry from the redo stack (moves its inverse to the undo stack)
    pub fn pop_redo(&mut self) -> Option<UndoEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.inverse());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the entry the next undo would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|entry| entry.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }
}
