use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};

use super::Context;
use crate::error::MissionError;
use crate::mission::{Mission, MissionStore};

#[derive(Args)]
pub struct IgnoreArgs {
    #[command(subcommand)]
    pub command: IgnoreCommand,
}

#[derive(Subcommand)]
pub enum IgnoreCommand {
    /// Append a regular expression matched against full paths
    Add {
        /// Mission name
        name: String,
        /// Regular expression
        regexp: String,
    },
    /// Remove the pattern at INDEX (as shown by `ignore list`)
    Remove {
        /// Mission name
        name: String,
        /// Zero-based pattern index
        index: usize,
    },
    /// Show the mission's patterns with their indices
    #[command(alias = "listall")]
    List {
        /// Mission name
        name: String,
    },
}

pub fn execute(args: IgnoreArgs, ctx: &Context) -> Result<()> {
    match args.command {
        IgnoreCommand::Add { name, regexp } => {
            let mut store = ctx.open_store()?;
            if mission_mut(&mut store, &name)?.add_ignore(&regexp)? {
                ctx.save_store(&mut store)?;
                ctx.output.success(&format!("Added ignore pattern {regexp} to {name}"));
            } else {
                ctx.output.warning(&format!("{name} already ignores {regexp}"));
            }
            Ok(())
        }
        IgnoreCommand::Remove { name, index } => {
            let mut store = ctx.open_store()?;
            let removed = mission_mut(&mut store, &name)?.remove_ignore(index)?;
            ctx.save_store(&mut store)?;
            ctx.output.success(&format!("Removed ignore pattern {removed} from {name}"));
            Ok(())
        }
        IgnoreCommand::List { name } => {
            let store = ctx.open_store()?;
            let mission = store.require(&name)?;
            if mission.ignore.is_empty() {
                ctx.output.info(&format!("{name} has no ignore patterns"));
            }
            for (index, expr) in mission.ignore.iter().enumerate() {
                ctx.output.list_item(&format!("{index}. {expr}"));
            }
            Ok(())
        }
    }
}

fn mission_mut<'a>(store: &'a mut MissionStore, name: &str) -> Result<&'a mut Mission> {
    store
        .get_mut(name)
        .ok_or_else(|| anyhow!(MissionError::NotFound(name.to_string())))
}
