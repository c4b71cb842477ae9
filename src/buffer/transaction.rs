//! Scoped undo transaction

use std::ops::{Deref, DerefMut};

use super::BufferAccess;

/// An open undo scope on a buffer.
///
/// Dropping the guard without calling [`complete`](Self::complete) discards
/// the scope, so early returns and panics never leave a transaction open.
pub struct Transaction<'a, B: BufferAccess + ?Sized> {
    buffer: &'a mut B,
    finished: bool,
}

impl<'a, B: BufferAccess + ?Sized> Transaction<'a, B> {
    pub fn begin(buffer: &'a mut B, label: &str) -> Self {
        buffer.begin_transaction(label);
        Self {
            buffer,
            finished: false,
        }
    }

    /// Keep the edits. Returns whether an undo entry was recorded.
    pub fn complete(mut self) -> bool {
        self.finished = true;
        self.buffer.complete_transaction()
    }

    /// Roll back the edits made inside this scope
    pub fn discard(mut self) {
        self.finished = true;
        self.buffer.discard_transaction();
    }
}

impl<B: BufferAccess + ?Sized> Deref for Transaction<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.buffer
    }
}

impl<B: BufferAccess + ?Sized> DerefMut for Transaction<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.buffer
    }
}

impl<B: BufferAccess + ?Sized> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Transaction dropped without completion, discarding");
            self.buffer.discard_transaction();
        }
    }
}
