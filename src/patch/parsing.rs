use super::error::{ParseError, ParseWarning};
use super::model::{FileChange, FileKind, Hunk, HunkLine, PatchDocument};
use super::text::{normalize_eol, strip_fence};

const DEV_NULL: &str = "/dev/null";

/// Normalize line endings and strip Markdown fencing.
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_input(raw: &str) -> Option<String> {
    let text = strip_fence(&normalize_eol(raw));
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse unified diff text into file sections and hunks.
///
/// Malformed hunk headers do not fail the parse: the hunk is skipped and a
/// [`ParseWarning`] is recorded on the returned document.
pub fn parse_diff(raw: &str) -> Result<PatchDocument, ParseError> {
    let src = normalize_input(raw).ok_or(ParseError::EmptyDiff)?;

    let mut scanner = Scanner::default();
    for (idx, line) in src.lines().enumerate() {
        scanner.feed(idx + 1, line);
    }
    let doc = scanner.finish();

    if doc.files.is_empty() {
        return Err(ParseError::NoFileHeader);
    }
    Ok(doc)
}

#[derive(Default)]
struct Scanner {
    doc: PatchDocument,
    file: Option<FileChange>,
    hunk: Option<Hunk>,
    /// Blank raw lines seen inside a hunk, kept only if more body follows.
    pending_blanks: usize,
    /// Body lines after a malformed header are dropped until the next header.
    skipping: bool,
}

impl Scanner {
    fn feed(&mut self, line_no: usize, line: &str) {
        if let Some(rest) = line.strip_prefix("--- ") {
            self.flush_file();
            let path = parse_old_path(rest);
            let kind = if path == DEV_NULL {
                FileKind::Create
            } else {
                FileKind::Modify
            };
            self.file = Some(FileChange::new(path, kind));
            return;
        }

        if let Some(rest) = line.strip_prefix("+++ ") {
            self.flush_hunk();
            if let Some(file) = self.file.as_mut() {
                apply_new_path(file, rest);
            }
            return;
        }

        if line.starts_with("@@") {
            self.flush_hunk();
            if self.file.is_none() {
                return;
            }
            match parse_hunk_header(line) {
                Some((old_start, old_count, new_start, new_count)) => {
                    self.skipping = false;
                    self.hunk = Some(Hunk {
                        old_start,
                        old_count,
                        new_start,
                        new_count,
                        header_line: line_no,
                        lines: Vec::new(),
                    });
                }
                None => {
                    tracing::warn!(line = line_no, header = %line, "parser: malformed hunk header");
                    self.skipping = true;
                    self.doc.warnings.push(ParseWarning::MalformedHunkHeader {
                        line: line_no,
                        header: line.to_string(),
                    });
                }
            }
            return;
        }

        if line.starts_with("diff ") {
            self.flush_hunk();
            return;
        }

        if self.skipping {
            return;
        }
        let Some(hunk) = self.hunk.as_mut() else {
            // Preamble, git extended headers, or prose between sections.
            return;
        };

        if line.is_empty() {
            self.pending_blanks += 1;
            return;
        }
        if line.starts_with("\\ ") {
            // `\ No newline at end of file`, or a localized variant of it.
            if let Some(HunkLine::Insert { no_newline, .. }) = hunk.lines.last_mut() {
                *no_newline = true;
            }
            return;
        }

        for _ in 0..std::mem::take(&mut self.pending_blanks) {
            hunk.lines.push(HunkLine::Context(String::new()));
        }
        hunk.lines.push(classify(line));
    }

    fn flush_hunk(&mut self) {
        self.pending_blanks = 0;
        self.skipping = false;
        let Some(hunk) = self.hunk.take() else {
            return;
        };
        if let Some(file) = self.file.as_mut() {
            file.hunks.push(hunk);
        }
    }

    fn flush_file(&mut self) {
        self.flush_hunk();
        if let Some(file) = self.file.take() {
            self.doc.files.push(file);
        }
    }

    fn finish(mut self) -> PatchDocument {
        self.flush_file();
        self.doc
    }
}

/// A line without a recognized marker is taken as context in its entirety.
fn classify(line: &str) -> HunkLine {
    if let Some(text) = line.strip_prefix(' ') {
        HunkLine::Context(text.to_string())
    } else if let Some(text) = line.strip_prefix('-') {
        HunkLine::Delete(text.to_string())
    } else if let Some(text) = line.strip_prefix('+') {
        HunkLine::insert(text)
    } else {
        HunkLine::Context(line.to_string())
    }
}

fn parse_old_path(rest: &str) -> String {
    if let Some(path) = rest.strip_prefix("a/") {
        return cut_at_tab(path).to_string();
    }
    cut_at_tab(rest).trim().to_string()
}

fn apply_new_path(file: &mut FileChange, rest: &str) {
    let target = cut_at_tab(rest).trim();
    if target == DEV_NULL {
        file.kind = FileKind::Delete;
        return;
    }
    if file.kind == FileKind::Create {
        file.path = target.strip_prefix("b/").unwrap_or(target).to_string();
    }
}

fn cut_at_tab(s: &str) -> &str {
    s.split('\t').next().unwrap_or(s)
}

/// Parse `@@ -a[,b] +c[,d] @@ ...`; missing counts default to 1.
fn parse_hunk_header(line: &str) -> Option<(usize, usize, usize, usize)> {
    let rest = line.strip_prefix("@@ ")?;
    let (ranges, _) = rest.split_once(" @@")?;
    let mut parts = ranges.split_whitespace();
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    if parts.next().is_some() {
        return None;
    }
    let (old_start, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;
    Some((old_start, old_count, new_start, new_count))
}

fn parse_range(s: &str) -> Option<(usize, usize)> {
    match s.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((s.parse().ok()?, 1)),
    }
}
