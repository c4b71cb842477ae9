//! Format on save - buffer normalization run when a document is saved
//!
//! This crate provides the transformation engine behind a format-on-save
//! feature: tab expansion, external sort/format tools, line-break
//! unification and end-of-file normalization, applied to a host buffer in
//! one undoable transaction.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod filter;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod tools;
pub mod tracing;
pub mod transform;

// Re-export commonly used types
pub use buffer::{BufferAccess, MemoryBuffer, Transaction};
pub use config::FormatOnSaveConfig;
pub use filter::{FilterPolicy, PathFilter};
pub use model::{Document, EditBatch, EditError, LanguageId, TextSnapshot};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport, Step, StepOutcome};
pub use tools::{ExternalTool, NoTools, ToolCommand, ToolError};
pub use transform::{ConfigurationError, LineBreakStyle};
