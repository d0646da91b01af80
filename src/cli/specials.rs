use eyre::Result;

use crate::cli::{args::USAGE, io};
use crate::patch::{parse_diff, summarize};

/// Handle one-shot commands like `help`, `version` or `stat`.
/// Returns the exit status when a special was handled and the program should exit.
pub fn handle_specials_if_needed(argv: &[String]) -> Result<Option<i32>> {
    let arg = argv.first().map(String::as_str).unwrap_or_default();

    if matches!(arg, "help" | "--help" | "-H" | "-h" | "-?") {
        println!(
            "{}{}",
            concat!(
                "mend: apply a unified diff to a directory tree\n\n",
                "  $ git diff | mend --root ../other-checkout\n",
                "  $ mend --dry-run fix.diff\n\n",
            ),
            USAGE
        );
        return Ok(Some(0));
    }

    if matches!(arg, "version" | "--version" | "-V" | "-v") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(Some(0));
    }

    if matches!(arg, "stat" | "--stat") {
        let text = io::read_patch(argv.get(1).map(String::as_str))?;
        return match parse_diff(&text) {
            Ok(doc) => {
                print!("{}", summarize(&doc));
                for warning in &doc.warnings {
                    eprintln!("mend: {warning}");
                }
                Ok(Some(0))
            }
            Err(e) => {
                eprintln!("mend: {e}");
                Ok(Some(1))
            }
        };
    }

    // Otherwise, not a special
    Ok(None)
}
