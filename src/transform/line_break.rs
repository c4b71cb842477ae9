//! Line-break unification - rewrite every line terminator to one style

use std::str::FromStr;

use crate::model::{EditBatch, TextSnapshot};

use super::ConfigurationError;

/// Target terminator style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineBreakStyle {
    /// `\n`
    Unix,
    /// `\r\n`
    Windows,
}

impl LineBreakStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreakStyle::Unix => "\n",
            LineBreakStyle::Windows => "\r\n",
        }
    }

    /// Name used in the options file
    pub fn name(&self) -> &'static str {
        match self {
            LineBreakStyle::Unix => "lf",
            LineBreakStyle::Windows => "crlf",
        }
    }
}

impl FromStr for LineBreakStyle {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lf" | "unix" | "\\n" | "\n" => Ok(LineBreakStyle::Unix),
            "crlf" | "windows" | "\\r\\n" | "\r\n" => Ok(LineBreakStyle::Windows),
            _ => Err(ConfigurationError::UnsupportedLineBreak(s.to_string())),
        }
    }
}

/// Compute the edits that rewrite each non-conforming terminator.
///
/// The last line (no terminator) is never touched, and lines already ending
/// in the target produce no edits.
pub fn unify_line_breaks(snapshot: &TextSnapshot, style: LineBreakStyle) -> EditBatch {
    let target = style.as_str();
    let mut batch = snapshot.edit();

    for line in snapshot.lines() {
        let terminator = line.terminator();
        if terminator.is_none() || terminator.as_str() == target {
            continue;
        }
        batch.replace(line.end(), terminator.len(), target);
    }

    batch
}
