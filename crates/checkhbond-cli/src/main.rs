mod cli;
mod commands;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("checkhbond v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let result = match cli.command {
        Commands::Check(args) => {
            info!("Dispatching to 'check' command.");
            commands::check::run(args)
        }
        Commands::Build(args) => {
            info!("Dispatching to 'build' command.");
            commands::build::run(args)
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {e}");
    }
    result
}
