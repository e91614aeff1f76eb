// magpt CLI entry point

use anyhow::Context;
use clap::Parser;
use magpt_cli::{logging, output::OutputStyle, repl, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli
        .load_settings()
        .context("Failed to load client settings")?;

    logging::init_logging(cli.verbose, cli.quiet, &settings.log_level);
    tracing::debug!("Preferences stored in {}", settings.storage_dir.display());

    if let Err(e) = repl::run(cli, settings).await {
        eprintln!("{}", OutputStyle::default().error(&e.user_message()));
        std::process::exit(1);
    }
    Ok(())
}
