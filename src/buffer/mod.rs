//! Buffer access - how the pipeline reads and edits the host's text buffer
//!
//! The host owns the buffer; the pipeline only sees it through
//! [`BufferAccess`]. [`MemoryBuffer`] is the in-process implementation used by
//! the command-line host and by tests.

pub mod history;
pub mod memory;
pub mod transaction;

pub use history::{EditHistory, UndoEntry};
pub use memory::MemoryBuffer;
pub use transaction::Transaction;

use crate::model::{EditBatch, EditError, TextSnapshot};

/// Read/edit access to a document's buffer.
pub trait BufferAccess {
    /// Current immutable snapshot
    fn snapshot(&self) -> TextSnapshot;

    /// Apply a batch computed against the current snapshot, returning the
    /// new snapshot. A rejected batch leaves the buffer unchanged.
    fn apply(&mut self, batch: &EditBatch) -> Result<TextSnapshot, EditError>;

    /// Open an undo scope. Nested scopes fold into the outermost one.
    fn begin_transaction(&mut self, label: &str);

    /// Close the current scope, keeping its edits.
    ///
    /// Returns true when the outermost scope closed with edits and an undo
    /// entry was recorded.
    fn complete_transaction(&mut self) -> bool;

    /// Close the current scope, rolling back every edit applied inside the
    /// outermost scope.
    fn discard_transaction(&mut self);
}
