//! `pmo-scenario` entry point

use clap::Parser;
use pmo_cli::{execute, logging, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let output = execute(&cli.command)?;
    println!("{output}");
    Ok(())
}
