//! Buffer transformations
//!
//! Each transformation inspects an immutable [`TextSnapshot`](crate::model::TextSnapshot)
//! and returns an [`EditBatch`](crate::model::EditBatch) bound to it. None of
//! them touch the buffer themselves, and each one yields an empty batch when
//! run against its own output.

pub mod end_of_file;
pub mod line_break;
pub mod tab_to_space;
pub mod wide_char;

pub use end_of_file::unify_end_of_file;
pub use line_break::{unify_line_breaks, LineBreakStyle};
pub use tab_to_space::{spaces, tab_to_space};
pub use wide_char::is_wide;

/// Invalid settings for a single transformation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Tab width must be at least one column
    InvalidTabWidth(usize),
    /// Line break style is neither LF nor CRLF
    UnsupportedLineBreak(String),
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidTabWidth(width) => {
                write!(f, "Invalid tab width: {} (must be at least 1)", width)
            }
            ConfigurationError::UnsupportedLineBreak(style) => {
                write!(f, "Unsupported line break style: {:?}", style)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
