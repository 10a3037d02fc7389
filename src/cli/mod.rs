//! Command-line interface for grafter
//!
//! Parses arguments with clap, installs the tracing subscriber and dispatches
//! to one module per command.

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

use commands::{Context, graft, ignore, info, init, list, unregister};

/// Grafter - mirror a source directory tree into a destination
#[derive(Parser)]
#[command(
    name = "grafter",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mirror a source directory into a destination, honoring ignore rules",
    long_about = "Grafter keeps named missions (a source, a destination and a list of ignore \
                  regexes) and grafts them on demand: unignored source files are copied over, \
                  then destination files without a source counterpart are pruned."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Mission store file (overrides store.path)
    #[arg(long, value_name = "FILE", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new mission
    Init(init::InitArgs),
    /// Remove a registered mission
    Unregister(unregister::UnregisterArgs),
    /// Show the details of a mission
    Info(info::InfoArgs),
    /// List registered missions
    List(list::ListArgs),
    /// Copy the mission's source into its destination, then prune stale files
    Graft(graft::GraftArgs),
    /// Manage a mission's ignore patterns
    Ignore(ignore::IgnoreArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);

        let Some(command) = self.command else {
            Cli::command().print_help()?;
            return Ok(());
        };

        let output = Output::new(self.verbose > 0, self.quiet);
        let ctx = Context::load(self.config.as_deref(), self.store, output)?;

        match command {
            Commands::Init(args) => init::execute(args, &ctx),
            Commands::Unregister(args) => unregister::execute(args, &ctx),
            Commands::Info(args) => info::execute(args, &ctx),
            Commands::List(args) => list::execute(args, &ctx),
            Commands::Graft(args) => graft::execute(args, &ctx),
            Commands::Ignore(args) => ignore::execute(args, &ctx),
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // Keep the ignore/globset crates quiet below -vvv
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
