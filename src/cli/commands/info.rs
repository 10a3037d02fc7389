use anyhow::Result;
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct InfoArgs {
    /// Mission name
    pub name: String,
}

pub fn execute(args: InfoArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let mission = store.require(&args.name)?;

    ctx.output.header(&format!("Mission {}", mission.name));
    ctx.output.table_row("Source", &mission.src.display().to_string());
    ctx.output.table_row("Destination", &mission.dest.display().to_string());
    if mission.ignore.is_empty() {
        ctx.output.table_row("Ignore", "(none)");
    } else {
        for (index, expr) in mission.ignore.iter().enumerate() {
            ctx.output.table_row(&format!("Ignore #{index}"), expr);
        }
    }
    Ok(())
}
