pub fn normalize_eol(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Language tags that models put on their own line right after a fence.
const FENCE_TAGS: &[&str] = &["diff", "patch", "udiff", "python", "text"];

/// Strip a surrounding Markdown fence and a leading language tag, if any.
/// Text that does not start with a fence is returned trimmed but otherwise unchanged.
pub fn strip_fence(s: &str) -> String {
    let trimmed = s.trim();
    let Some(after_ticks) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // The rest of the opening fence line is an info string; drop it with the fence.
    let body = match after_ticks.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    let body = match body.find("\n```").map(|pos| &body[..pos + 1]) {
        Some(inner) => inner,
        None => body.strip_suffix("```").unwrap_or(body),
    };

    let mut lines = body.split_inclusive('\n');
    let first = body.lines().next().unwrap_or("").trim();
    if FENCE_TAGS.contains(&first.to_ascii_lowercase().as_str()) {
        let _ = lines.next();
        return lines.collect();
    }
    body.to_string()
}

/// Split file content into lines that keep their own terminators.
pub fn split_keep_terminators(s: &str) -> Vec<String> {
    s.split_inclusive('\n').map(str::to_string).collect()
}

/// Terminator most lines in the buffer use; `\n` for empty buffers.
pub fn dominant_terminator(buffer: &[String]) -> &'static str {
    let crlf = buffer.iter().filter(|l| l.ends_with("\r\n")).count();
    let lf = buffer.iter().filter(|l| l.ends_with('\n')).count();
    if crlf > 0 && crlf * 2 >= lf {
        "\r\n"
    } else {
        "\n"
    }
}

pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Compare a buffer line with diff text, ignoring the terminator and trailing whitespace.
pub fn eq_line_relaxed(buffer_line: &str, text: &str) -> bool {
    strip_terminator(buffer_line).trim_end() == text.trim_end()
}
