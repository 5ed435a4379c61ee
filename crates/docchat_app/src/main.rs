use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use docchat_app::logging::{self, LogDestination};
use docchat_app::{terminal, ClientConfig};
use log::LevelFilter;

/// Ask questions about a PDF through a docchat backend.
#[derive(Debug, Parser)]
#[command(name = "docchat", version)]
struct Cli {
    /// RON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides the config file and DOCCHAT_SERVER_URL.
    #[arg(long)]
    server: Option<String>,

    /// Log at debug level and mirror logs to the terminal.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_env();
    config.apply_server_override(cli.server);

    if cli.verbose {
        logging::initialize(LogDestination::Both(config.log_file.clone()), LevelFilter::Debug);
    } else {
        let level = config.level_filter()?;
        logging::initialize(LogDestination::File(config.log_file.clone()), level);
    }

    terminal::run(&config)
        .await
        .with_context(|| format!("running against {}", config.server_url))
}
