use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;
use crate::sync::{SyncOptions, SyncPipeline, SyncReport};

#[derive(Args)]
pub struct GraftArgs {
    /// Mission name
    pub name: String,

    /// Worker threads per pass (0 = derive from sync.max_threads / sync.thread_percentage)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Bound of the walker queue
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: GraftArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let mission = store.require(&args.name)?;
    tracing::info!("Do graft for {}", mission.name);

    let options = resolve_options(&args, ctx);
    ctx.output.verbose(&format!(
        "{} workers, queue capacity {}",
        options.workers, options.queue_capacity
    ));

    let pipeline = SyncPipeline::for_mission(mission).with_options(options);
    if !args.json {
        ctx.output.step(&format!(
            "Grafting {} -> {}",
            mission.src.display(),
            mission.dest.display()
        ));
    }
    let report = pipeline
        .run()
        .with_context(|| format!("Graft of mission {} failed", mission.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&args.name, &report, ctx);
    }
    Ok(())
}

fn resolve_options(args: &GraftArgs, ctx: &Context) -> SyncOptions {
    let mut options = SyncOptions::from_settings(&ctx.config.sync);
    if let Some(workers) = args.workers.filter(|w| *w > 0) {
        options.workers = workers;
    }
    if let Some(capacity) = args.queue_capacity {
        options.queue_capacity = capacity.max(1);
    }
    options
}

fn print_summary(name: &str, report: &SyncReport, ctx: &Context) {
    let output = &ctx.output;
    output.header(&format!("Graft {name}"));
    output.summary_stats("Copied", report.copied);
    output.summary_stats("Skipped", report.skipped);
    output.summary_stats("Deleted", report.deleted);
    output.summary_stats("Kept", report.kept);
    output.summary_stats("Bytes", report.bytes_copied);

    if report.is_clean() {
        output.success("Graft complete");
        return;
    }

    output.warning(&format!("Graft finished with {} errors", report.errors.len()));
    for error in &report.errors {
        match &error.path {
            Some(path) => output.error(&format!("{}: {}", path.display(), error.message)),
            None => output.error(&error.message),
        }
    }
}
