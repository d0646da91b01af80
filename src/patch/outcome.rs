use serde::Serialize;

use super::error::{HunkFailure, ParseWarning, PatchError};

/// Which tier ended up handling the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMethod {
    External,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Applied {
        path: String,
        hunks: usize,
        created: bool,
        deleted: bool,
    },
    Skipped {
        path: String,
        reason: SkipReason,
    },
    Failed {
        path: String,
        reason: FailReason,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &str {
        match self {
            FileOutcome::Applied { path, .. }
            | FileOutcome::Skipped { path, .. }
            | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, FileOutcome::Applied { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The path escapes the workspace root.
    OutsideWorkspace { detail: String },
    /// An ancestor of the path exists and is not a directory.
    NotCreatable { blocker: String },
    /// The section carried no usable hunks.
    NoHunks,
    /// Computed fine, but another file failed and nothing was committed.
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailReason {
    Hunks { failures: Vec<HunkFailure> },
    /// The diff creates the file but a non-empty one is already there.
    AlreadyExists,
    FileSystem { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub success: bool,
    pub method: Option<ApplyMethod>,
    pub message: String,
    pub error: Option<PatchError>,
    pub files: Vec<FileOutcome>,
    pub warnings: Vec<ParseWarning>,
    pub dry_run: bool,
}

impl ApplyResult {
    pub fn failure(error: PatchError) -> Self {
        Self {
            success: false,
            method: None,
            message: error.to_string(),
            error: Some(error),
            files: Vec::new(),
            warnings: Vec::new(),
            dry_run: false,
        }
    }

    pub fn external(dry_run: bool) -> Self {
        let message = if dry_run {
            "Patch checked by external tool"
        } else {
            "Patch applied by external tool"
        };
        Self {
            success: true,
            method: Some(ApplyMethod::External),
            message: message.to_string(),
            error: None,
            files: Vec::new(),
            warnings: Vec::new(),
            dry_run,
        }
    }

    /// Aggregate per-file outcomes of the manual tier.
    pub fn manual(files: Vec<FileOutcome>, warnings: Vec<ParseWarning>, dry_run: bool) -> Self {
        let applied = files.iter().filter(|f| f.is_applied()).count();
        let failed = files.iter().filter(|f| f.is_failed()).count();
        let skipped = files.len() - applied - failed;
        let success = failed == 0 && applied > 0;
        let message = match (success, dry_run) {
            (true, false) => format!("Patch applied manually ({applied} file(s))"),
            (true, true) => format!("Patch would apply manually ({applied} file(s))"),
            (false, _) => format!(
                "Manual application incomplete: {applied} applied, {skipped} skipped, {failed} failed"
            ),
        };
        Self {
            success,
            method: Some(ApplyMethod::Manual),
            message,
            error: None,
            files,
            warnings,
            dry_run,
        }
    }

    pub fn outcome(&self, path: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.path() == path)
    }
}
