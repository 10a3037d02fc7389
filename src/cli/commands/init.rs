use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::Args;

use super::Context;
use crate::mission::Mission;

#[derive(Args)]
pub struct InitArgs {
    /// Mission name
    pub name: String,
    /// Source directory
    pub src: PathBuf,
    /// Destination directory
    pub dest: PathBuf,
}

pub fn execute(args: InitArgs, ctx: &Context) -> Result<()> {
    let src = existing_dir(&args.src, "source")?;
    let dest = existing_dir(&args.dest, "destination")?;

    let mut store = ctx.open_store()?;
    store.add(Mission::new(&args.name, &src, &dest))?;
    ctx.save_store(&mut store)?;

    ctx.output.success(&format!(
        "Registered mission {} ({} -> {})",
        args.name,
        src.display(),
        dest.display()
    ));
    Ok(())
}

fn existing_dir(path: &Path, role: &str) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Cannot resolve {role} path {}", path.display()))?;
    if !absolute.is_dir() {
        bail!("{role} {} is not an existing directory", absolute.display());
    }
    Ok(absolute)
}
