//! End-of-file normalization - exactly one trailing blank line

use crate::model::{EditBatch, Terminator, TextSnapshot};

/// Compute the edits that leave the document ending in exactly one
/// terminator.
///
/// Blank means empty or whitespace only. Documents with fewer than two lines
/// and documents that are entirely blank are left alone, since there is not
/// enough content to infer a convention. When a terminator has to be
/// supplied, the style of the nearest terminated line above is mirrored.
pub fn unify_end_of_file(snapshot: &TextSnapshot) -> EditBatch {
    let mut batch = snapshot.edit();
    let line_count = snapshot.line_count();
    if line_count < 2 {
        return batch;
    }
    let last_index = line_count - 1;

    let Some(last_content) = (0..line_count).rev().find(|&index| {
        snapshot
            .line(index)
            .is_some_and(|line| !snapshot.is_blank(line))
    }) else {
        return batch;
    };
    let first_blank = last_content + 1;

    if first_blank > last_index {
        // No trailing blank line: supply one
        if let (Some(terminator), Some(line)) = (
            observed_terminator(snapshot, last_content),
            snapshot.line(last_content),
        ) {
            batch.insert(line.end(), terminator.as_str());
        }
    } else if first_blank < last_index {
        // Several trailing blank lines: collapse to one
        if let Some(first) = snapshot.line(first_blank) {
            let start = first.start();
            batch.delete(start, snapshot.len_chars() - start);
        }
    }

    batch
}

/// Terminator of the nearest line above `index` that has one
fn observed_terminator(snapshot: &TextSnapshot, index: usize) -> Option<Terminator> {
    (0..index)
        .rev()
        .filter_map(|i| snapshot.line(i))
        .map(|line| line.terminator())
        .find(|terminator| !terminator.is_none())
}
