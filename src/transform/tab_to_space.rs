//! Tab expansion - replace tab characters with spaces up to the next tab stop

use std::borrow::Cow;

use crate::model::{EditBatch, Line, TextSnapshot};

use super::wide_char::is_wide;
use super::ConfigurationError;

/// Pre-built run of spaces shared by all expansions.
/// Runs up to this length are borrowed; longer runs allocate.
const SPACES: &str = "                                ";

/// A run of `count` spaces
pub fn spaces(count: usize) -> Cow<'static, str> {
    if count <= SPACES.len() {
        Cow::Borrowed(&SPACES[..count])
    } else {
        Cow::Owned(" ".repeat(count))
    }
}

/// Compute the edits that expand every tab in the snapshot.
///
/// Returns an empty batch when the text has no tabs. A zero tab width is a
/// configuration error and produces no edits.
pub fn tab_to_space(
    snapshot: &TextSnapshot,
    tab_width: usize,
) -> Result<EditBatch, ConfigurationError> {
    if tab_width == 0 {
        return Err(ConfigurationError::InvalidTabWidth(tab_width));
    }

    let mut batch = snapshot.edit();
    for line in snapshot.lines() {
        expand_line(snapshot, line, tab_width, &mut batch);
    }
    Ok(batch)
}

/// Schedule the tab replacements for one line.
///
/// `adjustment` tracks how far the display column has drifted from the char
/// index: each tab adds `spaces - 1`, each wide char adds 1.
fn expand_line(snapshot: &TextSnapshot, line: &Line, tab_width: usize, batch: &mut EditBatch) {
    let text = snapshot.line_text(line);
    if !text.chars().any(|ch| ch == '\t') {
        return;
    }

    let mut adjustment = 0;
    for (index, ch) in text.chars().enumerate() {
        if ch == '\t' {
            let column = index + adjustment;
            let count = tab_width - column % tab_width;
            batch.replace(line.start() + index, 1, spaces(count));
            adjustment += count - 1;
        } else if is_wide(ch) {
            adjustment += 1;
        }
    }
}
