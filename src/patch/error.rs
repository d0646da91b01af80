use serde::Serialize;
use thiserror::Error;

/// Call-level failures reported in [`super::ApplyResult::error`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatchError {
    #[error("Empty diff")]
    EmptyDiff,
    #[error("Manual application failed: {source}")]
    ManualApplyFailure { source: ParseError },
    #[error("Staging failed: {message}")]
    Staging { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    #[error("diff is empty")]
    EmptyDiff,
    #[error("no `--- ` file header found")]
    NoFileHeader,
}

/// Recoverable problems found while parsing; the offending hunk is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    #[error("line {line}: malformed hunk header `{header}`, hunk skipped")]
    MalformedHunkHeader { line: usize, header: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HunkError {
    #[error("context mismatch at line {}: expected '{expected}', got '{actual}'", .position + 1)]
    ContextMismatch {
        expected: String,
        actual: String,
        /// 0-based index into the buffer as mutated so far.
        position: usize,
    },
    #[error("edit at line {} is past the end of the file ({len} lines)", .position + 1)]
    OutOfRangeEdit { position: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HunkFailure {
    /// Position of the hunk within its file section.
    pub index: usize,
    pub error: HunkError,
}

/// Why the external tier did not take the patch. Never surfaced to callers.
#[derive(Debug, Error)]
pub enum ExternalFailure {
    #[error("`{program}` is unavailable: {source}")]
    Unavailable {
        program: String,
        source: std::io::Error,
    },
    #[error("dry run rejected the patch: {stderr}")]
    Rejected { stderr: String },
    #[error("apply failed: {stderr}")]
    ApplyFailed { stderr: String },
    #[error("external tier disabled")]
    Disabled,
    #[error("io error talking to `{program}`: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}
