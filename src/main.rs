use anyhow::Result;
use clap::Parser;

use grafter::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
