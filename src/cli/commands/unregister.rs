use anyhow::Result;
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct UnregisterArgs {
    /// Mission name
    pub name: String,
}

pub fn execute(args: UnregisterArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    store.remove(&args.name)?;
    ctx.save_store(&mut store)?;

    ctx.output.success(&format!("Unregistered mission {}", args.name));
    Ok(())
}
