//! Entry splitting
//!
//! A log invocation starts on a line such as
//! `2024-01-05T10:00:00.000Z START RequestId: ...`. Everything from one such
//! line up to the next belongs to the same entry.

use regex::Regex;
use std::sync::LazyLock;

static ENTRY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T.*START RequestId").unwrap());

/// Split extracted text into one chunk per log invocation
///
/// Text before the first start marker forms an entry of its own, so a blob
/// without any marker is returned whole. Entries are trimmed and blank ones
/// dropped.
pub fn split_entries(content: &str) -> Vec<&str> {
    let mut boundaries = vec![0];
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if offset > 0 && ENTRY_START.is_match(line) {
            boundaries.push(offset);
        }
        offset += line.len();
    }
    boundaries.push(content.len());

    boundaries
        .windows(2)
        .map(|bounds| content[bounds[0]..bounds[1]].trim())
        .filter(|entry| !entry.is_empty())
        .collect()
}
