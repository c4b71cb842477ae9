//! Document model - documents, immutable text snapshots and edit batches

pub mod document;
pub mod edit;
pub mod language;
pub mod snapshot;

pub use document::{Document, DEFAULT_TAB_WIDTH};
pub use edit::{EditBatch, EditError, EditOperation};
pub use language::LanguageId;
pub use snapshot::{Line, Terminator, TextSnapshot};
