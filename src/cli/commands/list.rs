use anyhow::Result;
use clap::Args;

use super::Context;

#[derive(Args, Default)]
pub struct ListArgs {}

pub fn execute(_args: ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    if store.missions().is_empty() {
        ctx.output.info("No missions registered");
        return Ok(());
    }

    for mission in store.missions() {
        ctx.output.list_item(&format!(
            "{}  {} -> {}",
            mission.name,
            mission.src.display(),
            mission.dest.display()
        ));
    }
    Ok(())
}
