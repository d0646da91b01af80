//! Command-line entrypoint.
use eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let code = mend::cli::run().await?;
    std::process::exit(code);
}
