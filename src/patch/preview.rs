use super::model::{FileKind, PatchDocument};

/// Diffstat-style summary of a parsed diff, one line per file plus a total.
pub fn summarize(doc: &PatchDocument) -> String {
    let width = doc.files.iter().map(|f| f.path.len()).max().unwrap_or(0);
    let mut out = String::new();
    let (mut total_add, mut total_del) = (0usize, 0usize);
    for file in &doc.files {
        let add: usize = file.hunks.iter().map(|h| h.insertions()).sum();
        let del: usize = file.hunks.iter().map(|h| h.deletions()).sum();
        total_add += add;
        total_del += del;
        let marker = match file.kind {
            FileKind::Create => " (new)",
            FileKind::Delete => " (deleted)",
            FileKind::Modify => "",
        };
        out.push_str(&format!(
            "{:<width$} | +{add} -{del}{marker}\n",
            file.path
        ));
    }
    out.push_str(&format!(
        "{} file(s), +{total_add} -{total_del}",
        doc.files.len()
    ));
    if !doc.warnings.is_empty() {
        out.push_str(&format!(", {} hunk(s) skipped", doc.warnings.len()));
    }
    out.push('\n');
    out
}
