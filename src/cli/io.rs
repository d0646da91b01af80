use eyre::{Result, eyre};
use std::io::Read;

fn stdin_is_tty() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Read stdin fully as a single UTF-8 string.
/// Returns `None` when stdin is a TTY, so an interactive invocation does not hang.
pub fn read_whole_stdin() -> Result<Option<String>> {
    if stdin_is_tty() {
        return Ok(None);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| eyre!(e))?;
    Ok(Some(buf))
}

/// Load the patch text from `input` (a path), or from stdin when it is absent or `-`.
pub fn read_patch(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            read_whole_stdin()?.ok_or_else(|| eyre!("no patch given: pass a file or pipe one in"))
        }
        Some(path) => std::fs::read_to_string(path).map_err(|e| eyre!("{path}: {e}")),
    }
}
