use std::path::{Path, PathBuf};

use super::applying::{ContextPolicy, apply_all_hunks};
use super::error::PatchError;
use super::external::{Disabled, ExternalApply, GitApply};
use super::filesystem::{
    Staging, blocking_ancestor, load_buffer, remove_file_if_exists, resolve_within_root,
    write_lines,
};
use super::model::{FileChange, FileKind};
use super::outcome::{ApplyResult, FailReason, FileOutcome, SkipReason};
use super::parsing::{normalize_input, parse_diff};
use super::preview::summarize;
use crate::config::ApplyOptions;

/// Entry point of the engine. Holds configuration and the external tier only;
/// nothing is carried from one [`PatchOrchestrator::apply`] call to the next.
pub struct PatchOrchestrator {
    external: Box<dyn ExternalApply + Send + Sync>,
    options: ApplyOptions,
}

impl PatchOrchestrator {
    pub fn new(options: ApplyOptions) -> Self {
        let external: Box<dyn ExternalApply + Send + Sync> = if options.use_external {
            Box::new(GitApply::new(options.external_program.clone()))
        } else {
            Box::new(Disabled)
        };
        Self { external, options }
    }

    /// Use a custom external tier regardless of `options.use_external`.
    pub fn with_external(
        options: ApplyOptions,
        external: impl ExternalApply + Send + Sync + 'static,
    ) -> Self {
        Self {
            external: Box::new(external),
            options,
        }
    }

    /// Apply `raw_diff` to the tree under `root`.
    pub fn apply(&self, root: &Path, raw_diff: &str) -> ApplyResult {
        let Some(diff) = normalize_input(raw_diff) else {
            return ApplyResult::failure(PatchError::EmptyDiff);
        };

        let dry_run = self.options.dry_run;
        let external = if dry_run {
            self.external.check(root, &diff)
        } else {
            self.external.check_and_apply(root, &diff)
        };
        match external {
            Ok(()) => {
                tracing::info!(root = %root.display(), "orchestrator: external tool took the patch");
                return ApplyResult::external(dry_run);
            }
            Err(e) => tracing::debug!("orchestrator: external tier declined, falling back: {e}"),
        }

        let doc = match parse_diff(&diff) {
            Ok(doc) => doc,
            Err(source) => {
                tracing::warn!("orchestrator: could not parse diff: {source}");
                return ApplyResult::failure(PatchError::ManualApplyFailure { source });
            }
        };
        tracing::debug!("orchestrator: manual apply\n{}", summarize(&doc));

        match self.apply_manually(root, &doc.files) {
            Ok(files) => ApplyResult::manual(files, doc.warnings, dry_run),
            Err(error) => ApplyResult {
                warnings: doc.warnings,
                ..ApplyResult::failure(error)
            },
        }
    }

    fn apply_manually(
        &self,
        root: &Path,
        changes: &[FileChange],
    ) -> Result<Vec<FileOutcome>, PatchError> {
        let root = root.canonicalize().map_err(|e| PatchError::Staging {
            message: format!("workspace root {}: {e}", root.display()),
        })?;

        let mut planned: Vec<Planned> = Vec::new();
        let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(changes.len());
        for change in changes {
            let slot = outcomes.len();
            // Placeholder; replaced once the commit phase settles.
            outcomes.push(FileOutcome::Skipped {
                path: change.path.clone(),
                reason: SkipReason::RolledBack,
            });
            if let Err(outcome) = self.plan_file(&root, change, slot, &mut planned) {
                outcomes[slot] = outcome;
            }
        }

        let any_failed = outcomes.iter().any(FileOutcome::is_failed);
        if self.options.atomic && any_failed {
            tracing::warn!("orchestrator: a file failed, nothing committed");
            return Ok(outcomes);
        }
        if self.options.dry_run {
            for plan in planned {
                plan.settle(&mut outcomes);
            }
            return Ok(outcomes);
        }

        if self.options.atomic {
            self.commit_atomically(&root, planned, &mut outcomes)?;
        } else {
            for plan in planned {
                plan.write_in_place(&mut outcomes);
            }
        }
        Ok(outcomes)
    }

    fn commit_atomically(
        &self,
        root: &Path,
        planned: Vec<Planned>,
        outcomes: &mut [FileOutcome],
    ) -> Result<(), PatchError> {
        if planned.is_empty() {
            return Ok(());
        }
        let staging_err = |e: std::io::Error| PatchError::Staging {
            message: e.to_string(),
        };
        let mut staging = Staging::new(root).map_err(staging_err)?;
        for plan in &planned {
            match &plan.content {
                Some(lines) => staging
                    .stage_write(plan.target.clone(), lines)
                    .map_err(staging_err)?,
                None => staging.stage_remove(plan.target.clone()),
            }
        }
        tracing::debug!(files = planned.len(), "orchestrator: committing staged files");
        staging.commit().map_err(staging_err)?;
        for plan in planned {
            plan.settle(outcomes);
        }
        Ok(())
    }

    /// Compute the new content of one file section without touching the disk.
    ///
    /// A section naming a file that an earlier section already planned starts
    /// from that planned content, so repeated sections accumulate instead of
    /// overwriting each other. On success the plan for the file is updated or
    /// appended; on failure earlier plans are left as they were.
    fn plan_file(
        &self,
        root: &Path,
        change: &FileChange,
        slot: usize,
        planned: &mut Vec<Planned>,
    ) -> Result<(), FileOutcome> {
        let path = change.path.clone();
        let target = resolve_within_root(root, &change.path).map_err(|e| {
            tracing::warn!(%path, "orchestrator: skipping path outside workspace: {e}");
            FileOutcome::Skipped {
                path: path.clone(),
                reason: SkipReason::OutsideWorkspace {
                    detail: e.to_string(),
                },
            }
        })?;
        if let Some(blocker) = blocking_ancestor(root, &target) {
            return Err(FileOutcome::Skipped {
                path,
                reason: SkipReason::NotCreatable {
                    blocker: blocker.display().to_string(),
                },
            });
        }
        if change.hunks.is_empty() && change.kind != FileKind::Delete {
            return Err(FileOutcome::Skipped {
                path,
                reason: SkipReason::NoHunks,
            });
        }

        let earlier = planned.iter().position(|p| p.target == target);
        let existing = match earlier {
            Some(idx) => {
                tracing::debug!(%path, "orchestrator: section continues an earlier one");
                planned[idx].content.clone()
            }
            None => load_buffer(&target).map_err(|e| fs_failure(&path, "read", &e))?,
        };
        let created = existing.is_none();
        if change.kind == FileKind::Create
            && self.options.verify_context
            && existing.as_ref().is_some_and(|b| !b.is_empty())
        {
            return Err(FileOutcome::Failed {
                path,
                reason: FailReason::AlreadyExists,
            });
        }
        let buffer = existing.unwrap_or_default();

        let policy = if self.options.verify_context {
            ContextPolicy::Verify
        } else {
            ContextPolicy::Trust
        };
        let lines = apply_all_hunks(&buffer, &change.hunks, policy).map_err(|failures| {
            tracing::warn!(%path, failed = failures.len(), "orchestrator: hunks did not apply");
            FileOutcome::Failed {
                path: path.clone(),
                reason: FailReason::Hunks { failures },
            }
        })?;

        let deleted = change.kind == FileKind::Delete;
        let section = Section {
            slot,
            path,
            hunks: change.hunks.len(),
            created: created && !deleted,
            deleted,
        };
        let content = (!deleted).then_some(lines);
        match earlier {
            Some(idx) => {
                let plan = &mut planned[idx];
                plan.content = content;
                plan.sections.push(section);
            }
            None => planned.push(Planned {
                target,
                content,
                sections: vec![section],
            }),
        }
        Ok(())
    }
}

impl Default for PatchOrchestrator {
    fn default() -> Self {
        Self::new(ApplyOptions::from_env())
    }
}

/// One file whose new content is known. `content: None` means remove it.
struct Planned {
    target: PathBuf,
    content: Option<Vec<String>>,
    /// Every diff section that contributed, in diff order.
    sections: Vec<Section>,
}

struct Section {
    slot: usize,
    path: String,
    hunks: usize,
    created: bool,
    deleted: bool,
}

impl Planned {
    fn settle(self, outcomes: &mut [FileOutcome]) {
        for s in self.sections {
            outcomes[s.slot] = FileOutcome::Applied {
                path: s.path,
                hunks: s.hunks,
                created: s.created,
                deleted: s.deleted,
            };
        }
    }

    fn write_in_place(self, outcomes: &mut [FileOutcome]) {
        let res = match &self.content {
            Some(lines) => write_lines(&self.target, lines),
            None => remove_file_if_exists(&self.target),
        };
        match res {
            Ok(()) => self.settle(outcomes),
            Err(e) => {
                for s in &self.sections {
                    outcomes[s.slot] = fs_failure(&s.path, "write", &e);
                }
            }
        }
    }
}

fn fs_failure(path: &str, op: &str, e: &std::io::Error) -> FileOutcome {
    tracing::warn!(%path, "orchestrator: {op} failed: {e}");
    FileOutcome::Failed {
        path: path.to_string(),
        reason: FailReason::FileSystem {
            message: format!("{op}: {e}"),
        },
    }
}

/// Apply with options from the environment and `git` as the external tier.
pub fn apply(root: &Path, raw_diff: &str) -> ApplyResult {
    PatchOrchestrator::default().apply(root, raw_diff)
}
