use super::error::{HunkError, HunkFailure};
use super::model::{Hunk, HunkLine};
use super::text::{dominant_terminator, eq_line_relaxed, strip_terminator};

/// How strictly the buffer must agree with a hunk's context and deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPolicy {
    /// Context and deleted lines must match the buffer; edits past the end fail.
    Verify,
    /// Trust the header offsets and never look at the buffer's text.
    Trust,
}

/// Apply every hunk in order, each against the buffer left by the previous one.
///
/// Header offsets are pre-image line numbers, so each hunk is shifted by the net
/// line count change of the hunks applied before it. Failing hunks are collected
/// and do not touch the buffer; the caller decides whether a partially
/// applicable file is written at all.
pub fn apply_all_hunks(
    buffer: &[String],
    hunks: &[Hunk],
    policy: ContextPolicy,
) -> Result<Vec<String>, Vec<HunkFailure>> {
    let mut lines = buffer.to_vec();
    let mut failures: Vec<HunkFailure> = Vec::new();
    let mut delta: isize = 0;
    for (index, hunk) in hunks.iter().enumerate() {
        let start = hunk.start_index().saturating_add_signed(delta);
        match apply_hunk_at(&lines, hunk, start, policy) {
            Ok(next) => {
                delta += hunk.insertions() as isize - hunk.deletions() as isize;
                lines = next;
            }
            Err(error) => failures.push(HunkFailure { index, error }),
        }
    }
    if failures.is_empty() {
        Ok(lines)
    } else {
        Err(failures)
    }
}

/// Apply one hunk at its header position.
pub fn apply_hunk(
    buffer: &[String],
    hunk: &Hunk,
    policy: ContextPolicy,
) -> Result<Vec<String>, HunkError> {
    apply_hunk_at(buffer, hunk, hunk.start_index(), policy)
}

/// Apply one hunk with its cursor starting at the 0-based `start`.
pub fn apply_hunk_at(
    buffer: &[String],
    hunk: &Hunk,
    start: usize,
    policy: ContextPolicy,
) -> Result<Vec<String>, HunkError> {
    let eol = dominant_terminator(buffer);
    let mut lines = buffer.to_vec();
    let mut cursor = start;

    for line in &hunk.lines {
        match line {
            HunkLine::Context(expected) => {
                if policy == ContextPolicy::Verify {
                    check_line(&lines, cursor, expected)?;
                    cursor += 1;
                } else if cursor < lines.len() {
                    cursor += 1;
                }
            }
            HunkLine::Delete(expected) => {
                if cursor >= lines.len() {
                    if policy == ContextPolicy::Trust {
                        continue;
                    }
                    return Err(HunkError::OutOfRangeEdit {
                        position: cursor,
                        len: lines.len(),
                    });
                }
                if policy == ContextPolicy::Verify {
                    check_line(&lines, cursor, expected)?;
                }
                lines.remove(cursor);
            }
            HunkLine::Insert { text, no_newline } => {
                let cursor_at = cursor.min(lines.len());
                if cursor_at == lines.len()
                    && let Some(last) = lines.last_mut()
                    && !last.ends_with('\n')
                {
                    last.push_str(eol);
                }
                let mut content = strip_terminator(text).to_string();
                if !no_newline {
                    content.push_str(eol);
                }
                lines.insert(cursor_at, content);
                cursor = cursor_at + 1;
            }
        }
    }
    Ok(lines)
}

fn check_line(lines: &[String], position: usize, expected: &str) -> Result<(), HunkError> {
    let Some(actual) = lines.get(position) else {
        return Err(HunkError::OutOfRangeEdit {
            position,
            len: lines.len(),
        });
    };
    if eq_line_relaxed(actual, expected) {
        Ok(())
    } else {
        Err(HunkError::ContextMismatch {
            expected: expected.to_string(),
            actual: strip_terminator(actual).to_string(),
            position,
        })
    }
}
