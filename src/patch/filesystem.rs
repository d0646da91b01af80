use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

use super::text::split_keep_terminators;

/// Resolve a diff path to an absolute path confined to `root`.
///
/// - `.` components are dropped and `..` is collapsed, never above the root.
/// - Absolute and prefixed paths are refused.
/// - Symlinks in the existing prefix are followed and the result re-checked.
///
/// # Errors
/// `PermissionDenied` when the path escapes the workspace; I/O errors from
/// canonicalizing the root or existing ancestors are propagated.
pub fn resolve_within_root(root: &Path, path: &str) -> io::Result<PathBuf> {
    let root = root.canonicalize()?;
    let input = Path::new(path);

    let mut rel = PathBuf::new();
    for c in input.components() {
        match c {
            Component::CurDir => {}
            Component::Normal(part) => rel.push(part),
            Component::ParentDir => {
                if !rel.pop() {
                    return Err(io::Error::new(
                        ErrorKind::PermissionDenied,
                        "path attempts to navigate above the workspace root",
                    ));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    ErrorKind::PermissionDenied,
                    "absolute paths are not allowed",
                ));
            }
        }
    }
    if rel.as_os_str().is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "path names the workspace root itself",
        ));
    }

    let real = soft_canonicalize(root.join(&rel))?;
    if !real.starts_with(&root) {
        return Err(io::Error::new(
            ErrorKind::PermissionDenied,
            "path resolves outside the workspace after following symlinks",
        ));
    }
    Ok(real)
}

/// Canonicalize the deepest existing ancestor of `p`, then append the missing tail.
pub fn soft_canonicalize<P: AsRef<Path>>(p: P) -> io::Result<PathBuf> {
    let mut probe = p.as_ref();

    let mut tail = Vec::new();
    while fs::symlink_metadata(probe).is_err() {
        match probe.parent() {
            Some(parent) => {
                if let Some(name) = probe.file_name() {
                    tail.push(name.to_os_string());
                }
                probe = parent;
            }
            None => break,
        }
    }

    let mut base = if fs::symlink_metadata(probe).is_ok() {
        probe.canonicalize()?
    } else {
        PathBuf::new()
    };
    for seg in tail.into_iter().rev() {
        base.push(seg);
    }
    Ok(base)
}

/// The first existing ancestor of `target` (below `root`) that is not a directory.
pub fn blocking_ancestor(root: &Path, target: &Path) -> Option<PathBuf> {
    target
        .ancestors()
        .skip(1)
        .take_while(|a| a.starts_with(root) && *a != root)
        .find(|a| a.exists() && !a.is_dir())
        .map(Path::to_path_buf)
}

/// Current content of `path` as a line buffer; `None` when the file does not exist.
pub fn load_buffer(path: &Path) -> io::Result<Option<Vec<String>>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let text = String::from_utf8(bytes)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("not UTF-8: {e}")))?;
    Ok(Some(split_keep_terminators(&text)))
}

/// What to do with one file once every file has been computed.
#[derive(Debug)]
enum Staged {
    Write {
        target: PathBuf,
        file: NamedTempFile,
    },
    Remove {
        target: PathBuf,
    },
}

/// New file contents parked in a private directory under the workspace root,
/// renamed into place only by [`Staging::commit`]. Dropping an uncommitted
/// staging area discards everything in it.
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
    entries: Vec<Staged>,
}

impl Staging {
    pub fn new(root: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(".mend-staging-")
            .tempdir_in(root)?;
        Ok(Self {
            dir,
            entries: Vec::new(),
        })
    }

    pub fn stage_write(&mut self, target: PathBuf, lines: &[String]) -> io::Result<()> {
        let mut file = NamedTempFile::new_in(self.dir.path())?;
        for line in lines {
            file.write_all(line.as_bytes())?;
        }
        file.flush()?;
        if let Ok(meta) = fs::metadata(&target) {
            // Keep the mode bits of the file being replaced.
            fs::set_permissions(file.path(), meta.permissions())?;
        }
        self.entries.push(Staged::Write { target, file });
        Ok(())
    }

    pub fn stage_remove(&mut self, target: PathBuf) {
        self.entries.push(Staged::Remove { target });
    }

    /// Move every staged file into place, creating parent directories as needed.
    pub fn commit(self) -> io::Result<()> {
        for entry in self.entries {
            match entry {
                Staged::Write { target, file } => {
                    if let Some(parent) = target.parent()
                        && !parent.as_os_str().is_empty()
                    {
                        fs::create_dir_all(parent)?;
                    }
                    file.persist(&target).map_err(|e| e.error)?;
                    tracing::trace!(path = %target.display(), "staging: committed");
                }
                Staged::Remove { target } => match fs::remove_file(&target) {
                    Ok(()) => tracing::trace!(path = %target.display(), "staging: removed"),
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                },
            }
        }
        drop(self.dir);
        Ok(())
    }
}

/// Write `lines` to `target` directly, creating parent directories.
pub fn write_lines(target: &Path, lines: &[String]) -> io::Result<()> {
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, lines.concat())
}

pub fn remove_file_if_exists(target: &Path) -> io::Result<()> {
    match fs::remove_file(target) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
