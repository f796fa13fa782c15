use clap::Parser;
use std::path::PathBuf;

mod cli;
mod config;
mod core;
mod error;
mod ui;
mod utils;

use cli::lookup::LookupArgs;
use config::Config;
use error::Result;

#[derive(Parser)]
#[command(name = "lexget")]
#[command(about = "Look up words in online dictionaries, with a local cache")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long)]
    version: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    lookup: LookupArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("lexget {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize logging
    utils::logging::init_logging(cli.debug)
        .map_err(error::LexGetError::Internal)?;

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    cli::lookup::execute(cli.lookup, &config).await
}
