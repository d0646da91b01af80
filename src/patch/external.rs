use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use super::error::ExternalFailure;

/// An already-installed tool that can check and apply a unified diff on its own.
pub trait ExternalApply {
    /// Non-mutating dry run.
    fn check(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure>;

    /// Mutating apply.
    fn apply(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure>;

    /// Apply only if the dry run accepts the patch.
    fn check_and_apply(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure> {
        self.check(root, diff)?;
        self.apply(root, diff)
    }
}

/// `git apply`, fed through stdin and run inside the workspace root.
#[derive(Debug, Clone)]
pub struct GitApply {
    pub program: String,
}

impl Default for GitApply {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitApply {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, root: &Path, diff: &str, check_only: bool) -> Result<(), RunError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("apply");
        if check_only {
            cmd.arg("--check");
        }
        cmd.current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(RunError::Spawn)?;
        if let Some(mut stdin) = child.stdin.take() {
            // git reads the whole patch before acting; close stdin to signal EOF.
            let mut body = diff.to_string();
            if !body.ends_with('\n') {
                body.push('\n');
            }
            stdin.write_all(body.as_bytes()).map_err(RunError::Io)?;
        }
        let output = child.wait_with_output().map_err(RunError::Io)?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(RunError::Status(stderr))
    }

    fn map_err(&self, err: RunError, check_only: bool) -> ExternalFailure {
        match err {
            RunError::Spawn(source) => ExternalFailure::Unavailable {
                program: self.program.clone(),
                source,
            },
            RunError::Io(source) => ExternalFailure::Io {
                program: self.program.clone(),
                source,
            },
            RunError::Status(stderr) if check_only => ExternalFailure::Rejected { stderr },
            RunError::Status(stderr) => ExternalFailure::ApplyFailed { stderr },
        }
    }
}

enum RunError {
    Spawn(std::io::Error),
    Io(std::io::Error),
    Status(String),
}

impl ExternalApply for GitApply {
    fn check(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure> {
        tracing::debug!(program = %self.program, "external: dry run");
        self.run(root, diff, true).map_err(|e| self.map_err(e, true))
    }

    fn apply(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure> {
        tracing::debug!(program = %self.program, "external: applying");
        self.run(root, diff, false).map_err(|e| self.map_err(e, false))
    }
}

/// Stand-in used when the external tier is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl ExternalApply for Disabled {
    fn check(&self, _root: &Path, _diff: &str) -> Result<(), ExternalFailure> {
        Err(ExternalFailure::Disabled)
    }

    fn apply(&self, _root: &Path, _diff: &str) -> Result<(), ExternalFailure> {
        Err(ExternalFailure::Disabled)
    }
}

impl<T: ExternalApply + ?Sized> ExternalApply for Box<T> {
    fn check(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure> {
        (**self).check(root, diff)
    }

    fn apply(&self, root: &Path, diff: &str) -> Result<(), ExternalFailure> {
        (**self).apply(root, diff)
    }
}
