use serde::Serialize;

use super::error::ParseWarning;

/// Everything parsed out of one diff text, in the order it was emitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchDocument {
    pub files: Vec<FileChange>,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Modify,
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path relative to the workspace root, with any `a/` prefix removed.
    pub path: String,
    pub kind: FileKind,
    pub hunks: Vec<Hunk>,
}

impl FileChange {
    pub fn new(path: String, kind: FileKind) -> Self {
        Self {
            path,
            kind,
            hunks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based line in the pre-image; 0 for hunks against an empty file.
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// 1-based line of the `@@` header inside the diff text.
    pub header_line: usize,
    pub lines: Vec<HunkLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Delete(String),
    Insert { text: String, no_newline: bool },
}

impl HunkLine {
    pub fn insert(text: impl Into<String>) -> Self {
        HunkLine::Insert {
            text: text.into(),
            no_newline: false,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            HunkLine::Context(t) | HunkLine::Delete(t) => t,
            HunkLine::Insert { text, .. } => text,
        }
    }
}

impl Hunk {
    /// 0-based buffer index the hunk starts at. A hunk that removes nothing
    /// (`-N,0`) inserts after line N rather than before it.
    pub fn start_index(&self) -> usize {
        if self.old_count == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }

    pub fn insertions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, HunkLine::Insert { .. }))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, HunkLine::Delete(_)))
            .count()
    }
}
