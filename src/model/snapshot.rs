//! Immutable text snapshots and their line tables

use std::sync::Arc;

use ropey::{Rope, RopeSlice};

use super::edit::{EditBatch, EditError, EditOperation};

/// Line-ending sequence attached to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// Last line of the document
    None,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// A lone `\r`
    Cr,
}

impl Terminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminator::None => "",
            Terminator::Lf => "\n",
            Terminator::CrLf => "\r\n",
            Terminator::Cr => "\r",
        }
    }

    /// Length in chars (equal to the length in bytes)
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Terminator::None)
    }
}

/// One line of a snapshot: its position, its content length and its terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    start: usize,
    len: usize,
    terminator: Terminator,
}

impl Line {
    /// Char offset of the first char of the line
    pub fn start(&self) -> usize {
        self.start
    }

    /// Char offset just past the content, where the terminator begins
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Char offset just past the terminator
    pub fn end_including_terminator(&self) -> usize {
        self.end() + self.terminator.len()
    }

    /// Content length in chars, excluding the terminator
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator
    }
}

/// An immutable view of a document's text at one version.
///
/// Every snapshot has at least one line; the empty text is a single empty
/// line without terminator. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    rope: Rope,
    lines: Arc<[Line]>,
    version: u64,
}

impl TextSnapshot {
    /// Create version 0 of a text
    pub fn new(text: &str) -> Self {
        Self::from_rope(Rope::from_str(text), 0)
    }

    pub fn from_rope(rope: Rope, version: u64) -> Self {
        let lines = scan_lines(&rope).into();
        Self {
            rope,
            lines,
            version,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lines.iter()
    }

    /// Content of a line, excluding its terminator
    pub fn line_text(&self, line: &Line) -> RopeSlice<'_> {
        self.rope.slice(line.start()..line.end())
    }

    /// Content of a line is empty or whitespace only
    pub fn is_blank(&self, line: &Line) -> bool {
        self.line_text(line).chars().all(char::is_whitespace)
    }

    /// Start an empty edit batch bound to this version
    pub fn edit(&self) -> EditBatch {
        EditBatch::new(self.version)
    }

    /// Apply a batch computed against this snapshot, producing the next version.
    ///
    /// Operations are applied in offset order (stable for equal offsets). The
    /// whole batch is rejected if any operation is stale, out of range or
    /// overlapping.
    pub fn apply(&self, batch: &EditBatch) -> Result<TextSnapshot, EditError> {
        if batch.version() != self.version {
            return Err(EditError::StaleSnapshot {
                expected: batch.version(),
                found: self.version,
            });
        }

        let text_len = self.rope.len_chars();
        let mut ordered: Vec<&EditOperation> = batch.operations().iter().collect();
        ordered.sort_by_key(|op| op.offset());

        let mut text = String::with_capacity(self.rope.len_bytes());
        let mut cursor = 0;
        // Start of the most recent delete; an insert there completes a replace
        let mut replace_at: Option<usize> = None;

        for op in ordered {
            let offset = op.offset();
            if offset > text_len {
                return Err(EditError::OutOfBounds {
                    offset,
                    len: 0,
                    text_len,
                });
            }

            match op {
                EditOperation::Delete { len, .. } => {
                    if offset < cursor {
                        return Err(EditError::Overlap { offset });
                    }
                    let Some(end) = offset.checked_add(*len).filter(|&end| end <= text_len) else {
                        return Err(EditError::OutOfBounds {
                            offset,
                            len: *len,
                            text_len,
                        });
                    };
                    push_slice(&mut text, self.rope.slice(cursor..offset));
                    cursor = end;
                    replace_at = Some(offset);
                }
                EditOperation::Insert { text: inserted, .. } => {
                    if offset < cursor && replace_at != Some(offset) {
                        return Err(EditError::Overlap { offset });
                    }
                    if offset >= cursor {
                        push_slice(&mut text, self.rope.slice(cursor..offset));
                        cursor = offset;
                    }
                    text.push_str(inserted);
                }
            }
        }
        push_slice(&mut text, self.rope.slice(cursor..));

        Ok(TextSnapshot::from_rope(
            Rope::from_str(&text),
            self.version.wrapping_add(1),
        ))
    }
}

impl std::fmt::Display for TextSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

fn push_slice(out: &mut String, slice: RopeSlice<'_>) {
    for chunk in slice.chunks() {
        out.push_str(chunk);
    }
}

/// Build the line table. Only `\n`, `\r\n` and a lone `\r` end a line.
fn scan_lines(rope: &Rope) -> Vec<Line> {
    let mut lines = Vec::with_capacity(rope.len_lines());
    let mut start = 0;
    let mut idx = 0;
    let mut chars = rope.chars().peekable();

    while let Some(ch) = chars.next() {
        let terminator = match ch {
            '\n' => Terminator::Lf,
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                Terminator::CrLf
            }
            '\r' => Terminator::Cr,
            _ => {
                idx += 1;
                continue;
            }
        };
        lines.push(Line {
            start,
            len: idx - start,
            terminator,
        });
        idx += terminator.len();
        start = idx;
    }

    lines.push(Line {
        start,
        len: idx - start,
        terminator: Terminator::None,
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminators(snapshot: &TextSnapshot) -> Vec<Terminator> {
        snapshot.lines().map(|l| l.terminator()).collect()
    }

    #[test]
    fn test_empty_text_is_one_line() {
        let snapshot = TextSnapshot::new("");
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(terminators(&snapshot), vec![Terminator::None]);
    }

    #[test]
    fn test_line_table_mixed_terminators() {
        let snapshot = TextSnapshot::new("a\r\nbb\ncc\rd");
        assert_eq!(snapshot.line_count(), 4);
        assert_eq!(
            terminators(&snapshot),
            vec![
                Terminator::CrLf,
                Terminator::Lf,
                Terminator::Cr,
                Terminator::None
            ]
        );
        let second = snapshot.line(1).unwrap();
        assert_eq!(second.start(), 3);
        assert_eq!(second.end(), 5);
        assert_eq!(second.end_including_terminator(), 6);
        assert_eq!(snapshot.line_text(second).to_string(), "bb");
    }

    #[test]
    fn test_trailing_terminator_yields_empty_last_line() {
        let snapshot = TextSnapshot::new("a\n");
        assert_eq!(snapshot.line_count(), 2);
        let last = snapshot.line(1).unwrap();
        assert!(last.is_empty());
        assert_eq!(last.start(), 2);
    }

    #[test]
    fn test_unicode_separators_do_not_split_lines() {
        let snapshot = TextSnapshot::new("a\u{2028}b\u{85}c");
        assert_eq!(snapshot.line_count(), 1);
    }

    #[test]
    fn test_is_blank() {
        let snapshot = TextSnapshot::new("  \t\nx");
        assert!(snapshot.is_blank(snapshot.line(0).unwrap()));
        assert!(!snapshot.is_blank(snapshot.line(1).unwrap()));
    }

    #[test]
    fn test_apply_replace_and_insert() {
        let snapshot = TextSnapshot::new("a\tb\r\n");
        let mut batch = snapshot.edit();
        batch.replace(1, 1, "   ");
        batch.replace(3, 2, "\n");
        let next = snapshot.apply(&batch).unwrap();
        assert_eq!(next.to_string(), "a   b\n");
        assert_eq!(next.version(), snapshot.version() + 1);
    }

    #[test]
    fn test_apply_multiple_inserts_keep_batch_order() {
        let snapshot = TextSnapshot::new("ac");
        let mut batch = snapshot.edit();
        batch.insert(1, "b");
        batch.insert(1, "B");
        assert_eq!(snapshot.apply(&batch).unwrap().to_string(), "abBc");
    }

    #[test]
    fn test_apply_offsets_refer_to_original_text() {
        let snapshot = TextSnapshot::new("\t\t");
        let mut batch = snapshot.edit();
        batch.replace(0, 1, "    ");
        batch.replace(1, 1, "    ");
        assert_eq!(snapshot.apply(&batch).unwrap().to_string(), "        ");
    }

    #[test]
    fn test_apply_rejects_stale_batch() {
        let snapshot = TextSnapshot::new("abc");
        let batch = EditBatch::new(7);
        assert_eq!(
            snapshot.apply(&batch).unwrap_err(),
            EditError::StaleSnapshot {
                expected: 7,
                found: 0
            }
        );
    }

    #[test]
    fn test_apply_rejects_overlap() {
        let snapshot = TextSnapshot::new("abcdef");
        let mut batch = snapshot.edit();
        batch.delete(1, 3);
        batch.delete(2, 1);
        assert_eq!(
            snapshot.apply(&batch).unwrap_err(),
            EditError::Overlap { offset: 2 }
        );
    }

    #[test]
    fn test_apply_rejects_out_of_bounds() {
        let snapshot = TextSnapshot::new("abc");
        let mut batch = snapshot.edit();
        batch.delete(2, 5);
        assert!(matches!(
            snapshot.apply(&batch),
            Err(EditError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_apply_rejects_delete_length_past_usize_max() {
        let snapshot = TextSnapshot::new("abc");
        let mut batch = snapshot.edit();
        batch.delete(1, usize::MAX);
        let err = snapshot.apply(&batch).unwrap_err();
        assert_eq!(
            err,
            EditError::OutOfBounds {
                offset: 1,
                len: usize::MAX,
                text_len: 3,
            }
        );
        // Display must not overflow either
        assert!(err.to_string().contains("length 3"));
        assert_eq!(snapshot.to_string(), "abc");
    }

    #[test]
    fn test_apply_handles_multibyte_text() {
        let snapshot = TextSnapshot::new("한\t글");
        let mut batch = snapshot.edit();
        batch.replace(1, 1, "  ");
        assert_eq!(snapshot.apply(&batch).unwrap().to_string(), "한  글");
    }
}
