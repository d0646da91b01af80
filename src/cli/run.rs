use eyre::Result;

use crate::cli::{args, io, specials};
use crate::config::ApplyOptions;
use crate::logging;
use crate::patch::{ApplyResult, PatchOrchestrator};

/// Run the engine off the async runtime, bounded by `timeout` when given.
/// On timeout the blocking task is abandoned; the process exits right after.
async fn apply_bounded(
    orchestrator: PatchOrchestrator,
    root: std::path::PathBuf,
    diff: String,
    timeout: Option<std::time::Duration>,
) -> Result<Option<ApplyResult>> {
    let task = tokio::task::spawn_blocking(move || orchestrator.apply(&root, &diff));
    match timeout {
        None => Ok(Some(task.await?)),
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => Ok(Some(joined?)),
            Err(_) => {
                tracing::error!(?limit, "cli: apply timed out; workspace may be partially updated");
                Ok(None)
            }
        },
    }
}

/// CLI entrypoint: specials first, then a single apply whose result goes to stdout as JSON.
/// Returns the process exit status.
pub async fn run() -> Result<i32> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    if let Some(code) = specials::handle_specials_if_needed(&argv)? {
        return Ok(code);
    }

    let args = match args::parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("mend: {e}\n\n{}", args::USAGE);
            return Ok(2);
        }
    };
    logging::setup_stderr_logger(args.verbose);

    let diff = io::read_patch(args.input.as_deref())?;
    let options = args.apply_to(ApplyOptions::from_env());
    tracing::debug!(?options, root = %args.root.display(), "cli: applying patch");

    let orchestrator = PatchOrchestrator::new(options);
    let Some(result) = apply_bounded(orchestrator, args.root.clone(), diff, args.timeout).await?
    else {
        eprintln!("mend: timed out");
        return Ok(1);
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.success { 0 } else { 1 })
}
