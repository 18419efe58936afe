// Fix Synthesis & Application
//
// A fix is a position-exact edit against the *original* source text.
// Fixes emitted during one pass never depend on each other, so a host can
// splice all of them in a single sweep without re-running any rule.

use serde::Serialize;

use crate::source::SourceRange;

/// A proposed source edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fix {
    /// Insert `text` right after the end of `range`.
    InsertAfter { range: SourceRange, text: String },

    /// Replace the text covered by `range` with `text`.
    Replace { range: SourceRange, text: String },

    /// Remove the text covered by `range`.
    Delete { range: SourceRange },
}

impl Fix {
    pub fn insert_after(range: &SourceRange, text: impl Into<String>) -> Self {
        Fix::InsertAfter {
            range: range.clone(),
            text: text.into(),
        }
    }

    pub fn replace(range: &SourceRange, text: impl Into<String>) -> Self {
        Fix::Replace {
            range: range.clone(),
            text: text.into(),
        }
    }

    pub fn delete(range: &SourceRange) -> Self {
        Fix::Delete {
            range: range.clone(),
        }
    }

    /// Byte span of the original text this edit consumes. Insertions
    /// consume nothing and sit at the end of their anchor range.
    pub fn span(&self) -> (usize, usize) {
        match self {
            Fix::InsertAfter { range, .. } => (range.end.byte, range.end.byte),
            Fix::Replace { range, .. } | Fix::Delete { range } => {
                (range.start.byte, range.end.byte)
            }
        }
    }

    pub fn replacement(&self) -> &str {
        match self {
            Fix::InsertAfter { text, .. } | Fix::Replace { text, .. } => text,
            Fix::Delete { .. } => "",
        }
    }

    pub fn deleted_range(&self) -> Option<&SourceRange> {
        match self {
            Fix::Delete { range } => Some(range),
            Fix::InsertAfter { .. } | Fix::Replace { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FixError {
    #[error("edit at bytes {start}..{end} falls outside the source ({len} bytes)")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("edit at bytes {start}..{end} is not on a character boundary")]
    NotCharBoundary { start: usize, end: usize },

    #[error("edit at bytes {start}..{end} overlaps a previous edit ending at byte {previous_end}")]
    Overlap {
        start: usize,
        end: usize,
        previous_end: usize,
    },
}

/// Apply a set of fixes to `source` in one pass.
///
/// Edits are ordered by start offset. The sort is stable, so edits at the
/// same offset (typically several insertions at the top of a config block)
/// land in the order they were emitted.
pub fn apply_fixes<'a, I>(source: &str, fixes: I) -> Result<String, FixError>
where
    I: IntoIterator<Item = &'a Fix>,
{
    let mut edits: Vec<&Fix> = fixes.into_iter().collect();
    edits.sort_by_key(|fix| fix.span().0);

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;

    for fix in edits {
        let (start, end) = fix.span();
        if start > end || end > source.len() {
            return Err(FixError::OutOfBounds {
                start,
                end,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(FixError::NotCharBoundary { start, end });
        }
        if start < cursor {
            return Err(FixError::Overlap {
                start,
                end,
                previous_end: cursor,
            });
        }

        output.push_str(&source[cursor..start]);
        output.push_str(fix.replacement());
        cursor = end;
    }

    output.push_str(&source[cursor..]);
    Ok(output)
}
