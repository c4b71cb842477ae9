//! Edit operations and batches scheduled against a snapshot
//!
//! Offsets and lengths are measured in chars (Unicode scalar values), the
//! same unit `ropey` indexes by.

/// A single primitive edit, positioned against the snapshot its batch was
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Remove `len` chars starting at `offset`
    Delete { offset: usize, len: usize },
    /// Insert `text` at `offset`
    Insert { offset: usize, text: String },
}

impl EditOperation {
    pub fn offset(&self) -> usize {
        match self {
            Self::Delete { offset, .. } | Self::Insert { offset, .. } => *offset,
        }
    }
}

/// Ordered edit operations computed against exactly one snapshot version.
///
/// Ranges must not overlap, except a delete immediately followed by an
/// insert at the same offset, which together act as a replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBatch {
    version: u64,
    operations: Vec<EditOperation>,
}

impl EditBatch {
    /// Create an empty batch for the given snapshot version
    pub fn new(version: u64) -> Self {
        Self {
            version,
            operations: Vec::new(),
        }
    }

    /// Snapshot version this batch was computed against
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn delete(&mut self, offset: usize, len: usize) {
        self.operations.push(EditOperation::Delete { offset, len });
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.operations.push(EditOperation::Insert {
            offset,
            text: text.into(),
        });
    }

    /// Schedule a delete-then-insert at the same offset
    pub fn replace(&mut self, offset: usize, len: usize, text: impl Into<String>) {
        self.delete(offset, len);
        self.insert(offset, text);
    }
}

/// Errors raised when applying a batch to a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The batch was computed against a different snapshot version
    StaleSnapshot { expected: u64, found: u64 },
    /// An operation reaches past the end of the text
    OutOfBounds { offset: usize, len: usize, text_len: usize },
    /// Two operations describe overlapping ranges
    Overlap { offset: usize },
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::StaleSnapshot { expected, found } => write!(
                f,
                "edit batch computed against version {} applied to version {}",
                expected, found
            ),
            EditError::OutOfBounds {
                offset,
                len,
                text_len,
            } => write!(
                f,
                "edit at {}..{} is outside the text (length {})",
                offset,
                offset.saturating_add(*len),
                text_len
            ),
            EditError::Overlap { offset } => write!(f, "overlapping edit at offset {}", offset),
        }
    }
}

impl std::error::Error for EditError {}
